// SPDX-License-Identifier: MIT

//! Additive risk and confidence scoring
//!
//! Scores are plain sums of fixed weights so every number can be traced
//! back to the signals that produced it.
//!
//! Risk:
//! - +30 when the boundary changed
//! - +40 when at least one test case was supplied
//! - +20 when the variable is sensitive (pricing, finance)
//!
//! Confidence starts at 100 and loses 40 for a boundary change and 40 for an
//! expected/detected mismatch.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::types::{RiskLevel, Status};

pub const BOUNDARY_WEIGHT: u32 = 30;
pub const TEST_CASE_WEIGHT: u32 = 40;
pub const SENSITIVE_WEIGHT: u32 = 20;

pub const DEFAULT_SENSITIVE_VARIABLES: &[&str] = &["price", "interest"];

/// Risk scorer with a configurable set of sensitive variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskScorer {
    sensitive: BTreeSet<String>,
}

/// A numeric risk score with its tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: u32,
    pub level: RiskLevel,
}

impl RiskScorer {
    pub fn new<I, S>(sensitive: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sensitive: sensitive.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_sensitive(&self, variable: &str) -> bool {
        self.sensitive.contains(variable)
    }

    pub fn score(&self, boundary_changed: bool, test_case_count: usize, variable: &str) -> RiskScore {
        let mut score = 0;

        if boundary_changed {
            score += BOUNDARY_WEIGHT;
        }
        if test_case_count > 0 {
            score += TEST_CASE_WEIGHT;
        }
        if self.is_sensitive(variable) {
            score += SENSITIVE_WEIGHT;
        }

        RiskScore {
            score,
            level: tier(score),
        }
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_VARIABLES.iter().copied())
    }
}

/// Map a score to its tier: ≥76 CRITICAL, ≥51 HIGH, ≥21 MEDIUM, else LOW
pub fn tier(score: u32) -> RiskLevel {
    match score {
        76.. => RiskLevel::Critical,
        51..=75 => RiskLevel::High,
        21..=50 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// Score risk with the default sensitive variables
pub fn score_risk(boundary_changed: bool, test_case_count: usize, variable: &str) -> RiskScore {
    RiskScorer::default().score(boundary_changed, test_case_count, variable)
}

/// Confidence that the verdict reflects real behavior, 0..=100
pub fn score_confidence(expected: &Value, detected: &Value, boundary_changed: bool) -> u32 {
    let mut score: i32 = 100;

    if boundary_changed {
        score -= 40;
    }
    if expected != detected {
        score -= 40;
    }

    score.max(0) as u32
}

/// What to do with the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Block,
    Review,
    Allow,
}

/// Final gate decision with its justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub decision: Action,
    pub risk_level: RiskLevel,
    pub reason: String,
}

/// FAIL blocks; an unverified boundary change needs review; otherwise allow
pub fn decide(status: Status, boundary_changed: bool) -> Decision {
    if status == Status::Fail {
        return Decision {
            decision: Action::Block,
            risk_level: RiskLevel::Critical,
            reason: "Client contract violation detected".to_string(),
        };
    }

    if boundary_changed {
        return Decision {
            decision: Action::Review,
            risk_level: RiskLevel::Medium,
            reason: "Boundary condition changed without detected violation".to_string(),
        };
    }

    Decision {
        decision: Action::Allow,
        risk_level: RiskLevel::Low,
        reason: "No contract or behavioral impact detected".to_string(),
    }
}
