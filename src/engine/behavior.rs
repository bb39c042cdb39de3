// SPDX-License-Identifier: MIT

//! Test-case driven behavior comparison
//!
//! Both conditions are evaluated against the first input of every case. A
//! case where the two paths disagree is a violation. Evaluation is pure, so
//! the same inputs always produce the same verdict.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::condition::{evaluate_condition, Condition};
use crate::engine::types::{RiskLevel, Status};

pub const BOUNDARY_REASON: &str = "Execution path changed due to boundary modification";
pub const BOUNDARY_RULE: &str = "Boundary Value Handling";

const FAIL_SUMMARY: &str = "Proposed change breaks client contract for boundary cases";
const PASS_SUMMARY: &str = "No behavioral deviation detected for provided contract cases";
const EMPTY_FAIL_SUMMARY: &str =
    "No contract cases supplied; behavior preservation cannot be demonstrated";
const EMPTY_PASS_SUMMARY: &str = "No contract cases supplied; behavior was not exercised";

/// A concrete input with the output the client expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// The first element is the value of the variable under test
    pub input: Vec<f64>,
    #[serde(default)]
    pub expected_output: Value,
}

/// Caller constraints on what the change may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Constraints {
    /// Missing test cases fail the verdict instead of passing it
    #[serde(default)]
    pub no_behavior_change: bool,
}

/// A test case whose execution path changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub input_case: Vec<f64>,
    pub expected: Value,
    pub detected_value: f64,
    pub old_path: bool,
    pub new_path: bool,
    pub reason: String,
}

/// Terminal result of a behavior comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    pub status: Status,
    pub risk_level: RiskLevel,
    pub violations: Vec<ViolationRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_rules: Vec<String>,
    pub summary: String,
}

impl TestCase {
    pub fn new(value: f64, expected_output: Value) -> Self {
        Self {
            input: vec![value],
            expected_output,
        }
    }

    /// The value of the variable under test, if any input was given
    pub fn subject(&self) -> Option<f64> {
        self.input.first().copied()
    }
}

impl AnalysisVerdict {
    pub fn pass(summary: impl Into<String>) -> Self {
        Self {
            status: Status::Pass,
            risk_level: RiskLevel::Low,
            violations: Vec::new(),
            affected_rules: Vec::new(),
            summary: summary.into(),
        }
    }

    pub fn is_fail(&self) -> bool {
        self.status == Status::Fail
    }
}

/// Compare the execution paths of `old` and `new` over `cases`
pub fn compare_behavior(
    old: &Condition,
    new: &Condition,
    cases: &[TestCase],
    constraints: &Constraints,
) -> AnalysisVerdict {
    let mut violations = Vec::new();
    let mut exercised = 0usize;

    for case in cases {
        let Some(value) = case.subject() else {
            log::warn!("Skipping test case with empty input");
            continue;
        };
        exercised += 1;

        let old_path = evaluate_condition(old, value);
        let new_path = evaluate_condition(new, value);
        log::debug!(
            "value {}: '{}' -> {}, '{}' -> {}",
            value,
            old,
            old_path,
            new,
            new_path
        );

        if old_path != new_path {
            violations.push(ViolationRecord {
                input_case: case.input.clone(),
                expected: case.expected_output.clone(),
                detected_value: value,
                old_path,
                new_path,
                reason: BOUNDARY_REASON.to_string(),
            });
        }
    }

    if !violations.is_empty() {
        return AnalysisVerdict {
            status: Status::Fail,
            risk_level: RiskLevel::Critical,
            violations,
            affected_rules: vec![BOUNDARY_RULE.to_string()],
            summary: FAIL_SUMMARY.to_string(),
        };
    }

    if exercised == 0 {
        if constraints.no_behavior_change {
            return AnalysisVerdict {
                status: Status::Fail,
                risk_level: RiskLevel::Medium,
                violations: Vec::new(),
                affected_rules: Vec::new(),
                summary: EMPTY_FAIL_SUMMARY.to_string(),
            };
        }
        return AnalysisVerdict::pass(EMPTY_PASS_SUMMARY);
    }

    AnalysisVerdict::pass(PASS_SUMMARY)
}

/// Result of checking a verdict against the client's stated expectations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationCheck {
    pub result: ExpectationResult,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpectationResult {
    Pass,
    Fail,
    Warning,
}

/// Validate a verdict against the expected outputs the client supplied
pub fn match_expected_outputs(cases: &[TestCase], verdict: &AnalysisVerdict) -> ExpectationCheck {
    let has_expectations = cases.iter().any(|c| !c.expected_output.is_null());
    if !has_expectations {
        return ExpectationCheck {
            result: ExpectationResult::Fail,
            reason: "Expected outputs missing".to_string(),
        };
    }

    match verdict.status {
        Status::Pass if verdict.violations.is_empty() => ExpectationCheck {
            result: ExpectationResult::Pass,
            reason: "No behavioral deviation".to_string(),
        },
        Status::Fail if !verdict.violations.is_empty() => ExpectationCheck {
            result: ExpectationResult::Fail,
            reason: verdict
                .violations
                .iter()
                .map(|v| format!("input {:?}: {}", v.input_case, v.reason))
                .collect::<Vec<_>>()
                .join("; "),
        },
        _ => ExpectationCheck {
            result: ExpectationResult::Warning,
            reason: "Uncertain behavior".to_string(),
        },
    }
}
