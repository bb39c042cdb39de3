// SPDX-License-Identifier: MIT

//! End-to-end change analysis
//!
//! Composes extraction, semantic comparison, gate rules, behavior checks and
//! scoring into one report. Only parse failures abort a run; every other
//! problem ends up as a field of the report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::behavior::{
    compare_behavior, match_expected_outputs, AnalysisVerdict, Constraints, ExpectationCheck,
    TestCase,
};
use crate::engine::condition::{evaluate_condition, Condition};
use crate::engine::contracts::{check_function_contract, check_loop_invariant};
use crate::engine::error::AnalysisError;
use crate::engine::explain::{
    build_explanation, default_domains, narrate, Explanation, Narrative, NarrativeSignals,
};
use crate::engine::extract::{extract_conditions, match_rules, parse_condition_expr};
use crate::engine::gate::{analyze_boundary, GateAnalyzer, KeywordGateAnalyzer};
use crate::engine::score::{decide, score_confidence, Decision, RiskScorer};
use crate::engine::semantic::{analyze_direction, compare_semantics, SemanticDiff};
use crate::engine::simulate::{simulate_change, SimulationResult, SimulationStatus};
use crate::engine::types::{Finding, RiskLevel, Status};

/// Contract guarantees the change must keep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSpec {
    /// Input name the new condition must still reference
    #[serde(default)]
    pub function_input: Option<String>,
    /// Invariant text the rewritten code must still contain
    #[serde(default)]
    pub loop_invariant: Option<String>,
}

/// One analysis request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub old_condition: String,
    pub new_condition: String,
    #[serde(default)]
    pub source_code: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub contracts: ContractSpec,
    /// Produce a before/after rewrite of `source_code`
    #[serde(default)]
    pub simulate: bool,
}

/// Everything one analysis run found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub status: Status,
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub confidence: u32,
    pub boundary_changed: bool,
    pub decision: Decision,
    pub semantic_diff: SemanticDiff,
    pub findings: Vec<Finding>,
    pub verdict: AnalysisVerdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectations: Option<ExpectationCheck>,
    /// Conditions in the source matching the old condition's variable and operator
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub located: Vec<Condition>,
    pub explanation: Explanation,
    pub narrative: Narrative,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationResult>,
}

/// Runs the analysis pipeline with a fixed scoring and explanation setup
pub struct Analyzer {
    scorer: RiskScorer,
    domains: BTreeMap<String, String>,
    gate: Box<dyn GateAnalyzer + Send + Sync>,
}

impl Analyzer {
    pub fn new(scorer: RiskScorer, domains: BTreeMap<String, String>) -> Self {
        Self {
            scorer,
            domains,
            gate: Box::new(KeywordGateAnalyzer),
        }
    }

    /// Replace the connective heuristic
    pub fn with_gate_analyzer(mut self, gate: Box<dyn GateAnalyzer + Send + Sync>) -> Self {
        self.gate = gate;
        self
    }

    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisReport, AnalysisError> {
        let old = parse_condition_expr(&input.old_condition)?;
        let new = parse_condition_expr(&input.new_condition)?;
        log::debug!("Analyzing '{}' -> '{}'", old, new);

        let mut findings = Vec::new();

        let located = match &input.source_code {
            Some(source) => {
                let conditions = extract_conditions(source)?;
                let located: Vec<Condition> = match_rules(&conditions, &old.variable)
                    .into_iter()
                    .filter(|c| c.operator == old.operator)
                    .cloned()
                    .collect();
                if located.is_empty() {
                    findings.push(Finding::new(
                        "Condition not located",
                        "Old condition not found in code",
                    ));
                }
                located
            }
            None => Vec::new(),
        };

        let diff = compare_semantics(&old, &new);
        findings.extend(analyze_direction(&old, &new));

        let identical = input.old_condition.trim() == input.new_condition.trim();
        let gate_findings = if identical {
            Vec::new()
        } else {
            self.gate
                .analyze(&input.old_condition, &input.new_condition)
        };
        let logic_gate_change = gate_findings.first().map(|f| match f.rule.as_str() {
            "Logical widening" => "and → or".to_string(),
            "Logical narrowing" => "or → and".to_string(),
            other => other.to_string(),
        });
        let gate_changed = !gate_findings.is_empty();
        findings.extend(gate_findings);
        findings.extend(analyze_boundary(&old, &new));

        if let Some(name) = &input.contracts.function_input {
            findings.extend(check_function_contract(
                &input.old_condition,
                &input.new_condition,
                name,
            ));
        }

        let simulation = match (&input.source_code, input.simulate) {
            (Some(source), true) => Some(simulate_change(
                source,
                &input.old_condition,
                &input.new_condition,
            )?),
            _ => None,
        };

        if let Some(invariant) = &input.contracts.loop_invariant {
            let rewrite = match (&simulation, &input.source_code) {
                (Some(result), _) => Some(result.clone()),
                (None, Some(source)) => {
                    match simulate_change(source, &input.old_condition, &input.new_condition) {
                        Ok(result) => Some(result),
                        Err(err) => {
                            log::debug!("No rewrite for loop invariant check: {}", err);
                            None
                        }
                    }
                }
                (None, None) => None,
            };
            let (before, after) = match &rewrite {
                Some(SimulationResult {
                    status: SimulationStatus::Changed,
                    original_structure: Some(before),
                    modified_structure: Some(after),
                    ..
                }) => (before.as_str(), after.as_str()),
                _ => (input.old_condition.as_str(), input.new_condition.as_str()),
            };
            findings.extend(check_loop_invariant(before, after, invariant));
        }

        let boundary_changed = !diff.is_equivalent || gate_changed;

        let verdict = compare_behavior(&old, &new, &input.test_cases, &input.constraints);

        let expectations = if input.test_cases.is_empty() {
            None
        } else {
            Some(match_expected_outputs(&input.test_cases, &verdict))
        };

        let (expected, detected) = confidence_basis(&old, &new, &input.test_cases);
        let confidence = score_confidence(&expected, &detected, boundary_changed);

        let risk = self
            .scorer
            .score(boundary_changed, input.test_cases.len(), &old.variable);
        let risk_level = risk.level.max(verdict.risk_level);
        let decision = decide(verdict.status, boundary_changed);

        let explanation = build_explanation(&old.variable, old.operator, new.operator, &self.domains);
        let narrative = narrate(&NarrativeSignals {
            logic_gate_change,
            threshold_change: (old.value != new.value).then_some((old.value, new.value)),
            expected_output_match: (!input.test_cases.is_empty()).then(|| expected == detected),
            breaking_scenario: verdict.violations.first().map(|v| {
                format!(
                    "{} = {}: old path {}, new path {}",
                    old.variable, v.detected_value, v.old_path, v.new_path
                )
            }),
        });

        log::info!(
            "Analysis of '{}' -> '{}': {} / {} ({})",
            old,
            new,
            verdict.status,
            risk_level,
            risk.score
        );

        Ok(AnalysisReport {
            status: verdict.status,
            risk_level,
            risk_score: risk.score,
            confidence,
            boundary_changed,
            decision,
            semantic_diff: diff,
            findings,
            verdict,
            expectations,
            located,
            explanation,
            narrative,
            simulation,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(RiskScorer::default(), default_domains())
    }
}

/// Expected vs detected outcome used for confidence.
///
/// Prefers the first case whose paths diverge, then the first usable case.
/// Without cases the expectation is unknown (`null`), which never matches.
fn confidence_basis(old: &Condition, new: &Condition, cases: &[TestCase]) -> (Value, Value) {
    let usable: Vec<(&TestCase, f64)> = cases
        .iter()
        .filter_map(|c| c.subject().map(|v| (c, v)))
        .collect();

    let chosen = usable
        .iter()
        .find(|(_, v)| evaluate_condition(old, *v) != evaluate_condition(new, *v))
        .or_else(|| usable.first());

    match chosen {
        Some((case, value)) => (
            case.expected_output.clone(),
            json!(evaluate_condition(new, *value)),
        ),
        None => (
            Value::Null,
            json!(evaluate_condition(new, old.value as f64)),
        ),
    }
}
