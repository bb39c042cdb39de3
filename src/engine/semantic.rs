// SPDX-License-Identifier: MIT

//! Symbolic comparison of two conditions
//!
//! Equivalence is decided over the integers: `x >= 18` and `x > 17` accept
//! exactly the same inputs. Direction and variable changes are reported as
//! separate findings and never folded into the equivalence result.

use serde::{Deserialize, Serialize};

use crate::engine::condition::{CompareOp, Condition, Direction};
use crate::engine::types::{Finding, RiskLevel};

/// Result of comparing an old and a new condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticDiff {
    pub old: Condition,
    pub new: Condition,
    /// `new.value - old.value`
    pub boundary_shift: i64,
    pub is_equivalent: bool,
    /// LOW when equivalent, HIGH otherwise
    pub risk_level: RiskLevel,
    pub restriction: Restriction,
}

/// How the accepted input set moved between old and new
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    /// Same accepted set
    Unchanged,
    /// Fewer inputs accepted
    MoreRestrictive,
    /// More inputs accepted
    LessRestrictive,
    /// Equality target moved
    Shifted,
    /// Directions differ or `!=` involved
    Incomparable,
}

impl SemanticDiff {
    pub fn direction_reversed(&self) -> bool {
        self.old.operator.direction() != self.new.operator.direction()
    }

    pub fn variable_changed(&self) -> bool {
        self.old.variable != self.new.variable
    }
}

/// Classify the change from `old` to `new`.
///
/// Rules, first match wins:
/// 1. identical operator and value
/// 2. `>= v` to `> v-1`
/// 3. `<= v` to `< v+1`
///
/// Anything else is non-equivalent. A variable change is advisory here;
/// [`analyze_direction`] reports it.
pub fn compare_semantics(old: &Condition, new: &Condition) -> SemanticDiff {
    let boundary_shift = new.value.saturating_sub(old.value);

    let is_equivalent = match (old.operator, new.operator) {
        (a, b) if a == b && old.value == new.value => true,
        (CompareOp::Gte, CompareOp::Gt) => old.value.checked_sub(1) == Some(new.value),
        (CompareOp::Lte, CompareOp::Lt) => old.value.checked_add(1) == Some(new.value),
        _ => false,
    };

    let risk_level = if is_equivalent {
        RiskLevel::Low
    } else {
        RiskLevel::High
    };

    SemanticDiff {
        old: old.clone(),
        new: new.clone(),
        boundary_shift,
        is_equivalent,
        risk_level,
        restriction: classify_restriction(old, new),
    }
}

/// Variable and direction findings for a condition pair
pub fn analyze_direction(old: &Condition, new: &Condition) -> Vec<Finding> {
    let mut findings = Vec::new();

    if old.variable != new.variable {
        findings.push(Finding::new("Variable changed", "Logic target modified"));
    }

    if old.operator.direction() != new.operator.direction() {
        findings.push(Finding::new(
            "Condition direction reversed",
            "Accept ↔ Reject logic inverted",
        ));
    }

    findings
}

fn classify_restriction(old: &Condition, new: &Condition) -> Restriction {
    match (old.operator.direction(), new.operator.direction()) {
        (Some(Direction::Gt), Some(Direction::Gt)) => {
            match lower_bound(new).cmp(&lower_bound(old)) {
                std::cmp::Ordering::Greater => Restriction::MoreRestrictive,
                std::cmp::Ordering::Less => Restriction::LessRestrictive,
                std::cmp::Ordering::Equal => Restriction::Unchanged,
            }
        }
        (Some(Direction::Lt), Some(Direction::Lt)) => {
            match upper_bound(new).cmp(&upper_bound(old)) {
                std::cmp::Ordering::Less => Restriction::MoreRestrictive,
                std::cmp::Ordering::Greater => Restriction::LessRestrictive,
                std::cmp::Ordering::Equal => Restriction::Unchanged,
            }
        }
        (Some(Direction::Eq), Some(Direction::Eq)) => {
            if old.value == new.value {
                Restriction::Unchanged
            } else {
                Restriction::Shifted
            }
        }
        (None, None) if old.value == new.value => Restriction::Unchanged,
        _ => Restriction::Incomparable,
    }
}

/// Smallest accepted integer of a gt-like condition
fn lower_bound(cond: &Condition) -> i128 {
    match cond.operator {
        CompareOp::Gt => cond.value as i128 + 1,
        _ => cond.value as i128,
    }
}

/// Largest accepted integer of a lt-like condition
fn upper_bound(cond: &Condition) -> i128 {
    match cond.operator {
        CompareOp::Lt => cond.value as i128 - 1,
        _ => cond.value as i128,
    }
}
