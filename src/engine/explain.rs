//! Template-based explanations
//!
//! Turns analysis signals into short human-readable sentences. No external
//! text generation is involved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::condition::CompareOp;

pub const FALLBACK_DOMAIN: &str = "Business Logic";

/// Default variable → business domain mapping
pub fn default_domains() -> BTreeMap<String, String> {
    [
        ("price", "Pricing"),
        ("coupon", "Promotions"),
        ("age", "Eligibility"),
        ("interest", "Finance"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Structured explanation of an operator change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub what_changed: String,
    pub why_it_matters: String,
    pub who_is_affected: String,
    pub business_impact: String,
}

pub fn build_explanation(
    variable: &str,
    old_op: CompareOp,
    new_op: CompareOp,
    domains: &BTreeMap<String, String>,
) -> Explanation {
    let domain = domains
        .get(variable)
        .map(String::as_str)
        .unwrap_or(FALLBACK_DOMAIN);

    Explanation {
        what_changed: format!("Condition operator changed from {} to {}", old_op, new_op),
        why_it_matters: "Boundary value behavior may change".to_string(),
        who_is_affected: format!("Users where {} equals boundary value", variable),
        business_impact: format!("Potential contract violation in {}", domain),
    }
}

/// Signals feeding the narrative
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NarrativeSignals {
    /// e.g. `and → or`
    pub logic_gate_change: Option<String>,
    /// (old threshold, new threshold)
    pub threshold_change: Option<(i64, i64)>,
    pub expected_output_match: Option<bool>,
    /// A concrete input on which old and new disagree
    pub breaking_scenario: Option<String>,
}

/// Human narrative plus the concrete breaking scenarios
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub human_explanation: Vec<String>,
    pub breaking_scenarios: Vec<String>,
}

pub fn narrate(signals: &NarrativeSignals) -> Narrative {
    let mut explanations = Vec::new();
    let mut scenarios = Vec::new();

    if let Some(gate) = &signals.logic_gate_change {
        explanations.push(format!(
            "The logical condition was changed from {}, which alters how rules are enforced.",
            gate
        ));
    }

    if let Some((old, new)) = signals.threshold_change {
        if new < old {
            explanations.push(format!(
                "The minimum required threshold was reduced from {} to {}, allowing weaker conditions to pass.",
                old, new
            ));
        } else if new > old {
            explanations.push(format!(
                "The minimum required threshold was increased from {} to {}, making access more restrictive.",
                old, new
            ));
        }
    }

    if signals.expected_output_match == Some(false) {
        explanations.push(
            "The new logic does not satisfy the expected behavior defined by the client."
                .to_string(),
        );
    }

    if let Some(scenario) = &signals.breaking_scenario {
        scenarios.push(scenario.clone());
        explanations.push(
            "A concrete scenario exists where the old and new logic take different paths."
                .to_string(),
        );
    }

    if explanations.is_empty() {
        explanations.push("No significant semantic behavior change was detected.".to_string());
    }

    Narrative {
        human_explanation: explanations,
        breaking_scenarios: scenarios,
    }
}
