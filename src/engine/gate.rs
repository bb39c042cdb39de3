//! Logical connective and boundary rules
//!
//! Connective detection is a substring heuristic: any occurrence of `and` or
//! `or` counts, including inside identifiers such as `order` or `brand`.
//! Callers go through [`GateAnalyzer`] so a real boolean parser can replace it.

use crate::engine::condition::{CompareOp, Condition};
use crate::engine::types::Finding;

/// Detects widening/narrowing between two raw condition strings
pub trait GateAnalyzer {
    fn analyze(&self, old_expr: &str, new_expr: &str) -> Vec<Finding>;
}

/// Token-presence implementation of [`GateAnalyzer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordGateAnalyzer;

impl GateAnalyzer for KeywordGateAnalyzer {
    fn analyze(&self, old_expr: &str, new_expr: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        if old_expr.contains("and") && new_expr.contains("or") {
            findings.push(Finding::new("Logical widening", "More users allowed"));
        }

        if old_expr.contains("or") && new_expr.contains("and") {
            findings.push(Finding::new("Logical narrowing", "More users blocked"));
        }

        findings
    }
}

/// Run the default keyword heuristic
pub fn analyze_boolean_gate(old_expr: &str, new_expr: &str) -> Vec<Finding> {
    KeywordGateAnalyzer.analyze(old_expr, new_expr)
}

/// Flag inclusive-to-strict operator changes, whatever the threshold did
pub fn analyze_boundary(old: &Condition, new: &Condition) -> Vec<Finding> {
    match (old.operator, new.operator) {
        (CompareOp::Gte, CompareOp::Gt) => {
            vec![Finding::new("Boundary tightened", "Equality case removed")]
        }
        (CompareOp::Lte, CompareOp::Lt) => {
            vec![Finding::new("Boundary tightened", "Upper boundary excluded")]
        }
        _ => Vec::new(),
    }
}
