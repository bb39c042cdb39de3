// SPDX-License-Identifier: MIT

//! What-if rewrite of a guard condition
//!
//! The first `if`/`elif` whose canonical test text equals the old condition
//! string has its test replaced by the new condition. Both versions are
//! re-serialized for side-by-side review. Nothing is executed.
//!
//! Matching compares the canonical rendering of the guard with the old
//! condition exactly as given. Redundant parentheses in the source are
//! normalized away, but the old condition text itself is not normalized:
//! `(price > 100)` never matches.

use serde::{Deserialize, Serialize};

use crate::engine::error::AnalysisError;
use crate::engine::syntax::render::Renderer;
use crate::engine::syntax::{
    parse_expression, parse_python, render_expression, render_module, walk, NodeVisitor, PyNode,
    SyntaxNode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationStatus {
    Changed,
    NoMatch,
}

/// Before/after structural artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub status: SimulationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_structure: Option<String>,
    /// 1-based line of the rewritten guard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl SimulationResult {
    fn no_match() -> Self {
        Self {
            status: SimulationStatus::NoMatch,
            reason: Some("Old condition not found".to_string()),
            original_structure: None,
            modified_structure: None,
            line: None,
        }
    }
}

/// Finds the first guard whose rendered test equals a target string
struct GuardFinder<'t> {
    target: &'t str,
    found: Option<(usize, usize)>,
}

impl<'a> NodeVisitor<PyNode<'a>> for GuardFinder<'_> {
    fn supports(&self, kind: &str) -> bool {
        self.found.is_none() && matches!(kind, "if_statement" | "elif_clause")
    }

    fn visit(&mut self, node: &PyNode<'a>) {
        if let Some(test) = node.field("condition") {
            if render_expression(&test) == self.target {
                self.found = Some((test.id(), test.line()));
            }
        }
    }
}

/// Rewrite the first guard matching `old_condition` to `new_condition`
pub fn simulate_change(
    source: &str,
    old_condition: &str,
    new_condition: &str,
) -> Result<SimulationResult, AnalysisError> {
    let parsed = parse_python(source)?;
    let replacement = parse_expression(new_condition)?;
    let replacement_text = replacement
        .single_expression()
        .map(|expr| render_expression(&expr))
        .ok_or_else(|| AnalysisError::invalid_condition(new_condition.trim()))?;

    let root = parsed.root();
    let mut finder = GuardFinder {
        target: old_condition,
        found: None,
    };
    walk(&root, &mut finder);

    let Some((node_id, line)) = finder.found else {
        log::info!("No guard matches '{}'", old_condition);
        return Ok(SimulationResult::no_match());
    };

    let original = render_module(&root);
    let modified = Renderer::with_replacement(node_id, &replacement_text).module(&root);

    Ok(SimulationResult {
        status: SimulationStatus::Changed,
        reason: None,
        original_structure: Some(original),
        modified_structure: Some(modified),
        line: Some(line),
    })
}
