//! Contract presence checks
//!
//! Same substring heuristic as the gate analyzer: a guarantee counts as
//! present if its text occurs anywhere in the code.

use crate::engine::types::Finding;

/// Flag a function input guarantee that disappears from the new condition
pub fn check_function_contract(old_cond: &str, new_cond: &str, input: &str) -> Vec<Finding> {
    if !input.is_empty() && old_cond.contains(input) && !new_cond.contains(input) {
        return vec![Finding::new(
            "Contract violation",
            "Function input guarantee removed",
        )];
    }
    Vec::new()
}

/// Flag a loop invariant that disappears from the new code
pub fn check_loop_invariant(old_code: &str, new_code: &str, invariant: &str) -> Vec<Finding> {
    if !invariant.is_empty() && old_code.contains(invariant) && !new_code.contains(invariant) {
        return vec![Finding::new(
            "Loop invariant removed",
            "Possible correctness risk",
        )];
    }
    Vec::new()
}
