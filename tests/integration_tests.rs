//! Integration tests for condition change analysis
//!
//! These tests drive the public API end to end: request loading, the
//! analysis pipeline, simulation, report envelopes and the HTTP handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use cronos_rs::cronos::config::{Settings, SettingsLoader};
use cronos_rs::cronos::report::ComplianceReport;
use cronos_rs::cronos::request::{Admission, ExtractRequest, RequestLoader, SimulateRequest};
use cronos_rs::cronos::server::{self, AppState};
use cronos_rs::engine::behavior::TestCase;
use cronos_rs::engine::gate::GateAnalyzer;
use cronos_rs::engine::score::{Action, RiskScorer};
use cronos_rs::engine::simulate::SimulationStatus;
use cronos_rs::engine::{AnalysisInput, Analyzer, Finding, RiskLevel, Status};
use once_cell::sync::Lazy;
use serde_json::json;

// ============================================================================
// Fixtures
// ============================================================================

static CHECKOUT: Lazy<String> = Lazy::new(|| {
    r#"
def checkout(price, age, coupon):
    if age < 18:
        return "blocked"
    if price >= 100:
        total = price * 0.9
    elif price >= 50 and coupon:
        total = price - 5
    else:
        total = price
    return total
"#
    .to_string()
});

/// Gate analyzer that flags every textual change
struct AnyChangeGate;

impl GateAnalyzer for AnyChangeGate {
    fn analyze(&self, old_expr: &str, new_expr: &str) -> Vec<Finding> {
        if old_expr != new_expr {
            vec![Finding::new("Expression changed", "Manual review")]
        } else {
            Vec::new()
        }
    }
}

fn request(old: &str, new: &str) -> AnalysisInput {
    AnalysisInput {
        old_condition: old.to_string(),
        new_condition: new.to_string(),
        ..Default::default()
    }
}

// ============================================================================
// Request Loading Tests
// ============================================================================

#[test]
fn test_yaml_request_end_to_end() {
    let yaml = r#"
old_condition: "price >= 100"
new_condition: "price > 100"
source_code: |
  def checkout(price):
      if price >= 100:
          return price * 0.9
      return price
test_cases:
  - input: [100]
    expected_output: true
  - input: [250]
    expected_output: true
simulate: true
"#;

    let req = RequestLoader::parse_yaml(yaml).expect("Failed to parse YAML");
    req.admit(&Settings::default().limits).unwrap();

    let report = Analyzer::default().analyze(&req).unwrap();
    assert_eq!(report.status, Status::Fail);
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert_eq!(report.verdict.violations.len(), 1);
    assert_eq!(report.verdict.violations[0].input_case, vec![100.0]);
    assert_eq!(report.located.len(), 1);
    assert_eq!(report.located[0].source_line, Some(2));

    let simulation = report.simulation.unwrap();
    assert_eq!(simulation.status, SimulationStatus::Changed);
    assert!(simulation
        .modified_structure
        .unwrap()
        .contains("if price > 100:"));
}

#[test]
fn test_load_request_from_json_file() {
    let path = std::env::temp_dir().join(format!("cronos-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"{"old_condition": "age >= 18", "new_condition": "age >= 17"}"#,
    )
    .unwrap();

    let req = RequestLoader::new().load_request(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(req.new_condition, "age >= 17");
}

#[test]
fn test_settings_drive_analysis() {
    let yaml = r#"
scoring:
  sensitive_variables: [age]
explain:
  domains:
    age: Compliance
"#;
    let settings = SettingsLoader::parse_yaml(yaml).unwrap();
    let report = settings
        .analyzer()
        .analyze(&request("age >= 18", "age >= 17"))
        .unwrap();

    assert_eq!(report.risk_score, 50);
    assert_eq!(report.risk_level, RiskLevel::Medium);
    assert_eq!(
        report.explanation.business_impact,
        "Potential contract violation in Compliance"
    );
}

// ============================================================================
// Analysis Scenario Tests
// ============================================================================

#[test]
fn test_equivalent_integer_rewrite() {
    let report = Analyzer::default()
        .analyze(&request("age >= 18", "age > 17"))
        .unwrap();

    assert!(report.semantic_diff.is_equivalent);
    assert!(!report.boundary_changed);
    assert_eq!(report.decision.decision, Action::Allow);
    // operator change alone still reports the tightened boundary
    assert_eq!(report.findings[0].rule, "Boundary tightened");
}

#[test]
fn test_direction_reversal() {
    let mut req = request("age >= 18", "age < 18");
    req.test_cases = vec![
        TestCase::new(17.0, json!(false)),
        TestCase::new(30.0, json!(true)),
    ];
    let report = Analyzer::default().analyze(&req).unwrap();

    assert!(report.semantic_diff.direction_reversed());
    assert!(report
        .findings
        .iter()
        .any(|f| f.rule == "Condition direction reversed"));
    assert_eq!(report.verdict.violations.len(), 2);
    assert_eq!(report.decision.decision, Action::Block);
}

#[test]
fn test_passing_cases_keep_review() {
    let mut req = request("price >= 100", "price >= 90");
    req.test_cases = vec![TestCase::new(150.0, json!(true))];
    let report = Analyzer::default().analyze(&req).unwrap();

    assert_eq!(report.status, Status::Pass);
    assert_eq!(report.risk_score, 90);
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert_eq!(report.decision.decision, Action::Review);
    assert_eq!(report.confidence, 60);
}

#[test]
fn test_locates_condition_in_larger_source() {
    let mut req = request("price >= 50", "price >= 40");
    req.source_code = Some(CHECKOUT.clone());
    let report = Analyzer::default().analyze(&req).unwrap();

    // every `price >=` rule is a candidate, whatever its threshold
    let values: Vec<i64> = report.located.iter().map(|c| c.value).collect();
    assert_eq!(values, vec![100, 50]);
    assert!(report.findings.iter().all(|f| f.rule != "Condition not located"));
}

#[test]
fn test_custom_gate_and_scorer() {
    let analyzer = Analyzer::new(RiskScorer::new(Vec::<String>::new()), Default::default())
        .with_gate_analyzer(Box::new(AnyChangeGate));
    let report = analyzer
        .analyze(&request("x > 5", "x  >  5"))
        .unwrap();

    assert!(report.boundary_changed);
    assert_eq!(report.risk_score, 30);
    assert_eq!(report.explanation.business_impact, "Potential contract violation in Business Logic");
}

// ============================================================================
// Simulation and Extraction Tests
// ============================================================================

#[test]
fn test_simulate_elif_guard() {
    let req = SimulateRequest {
        source_code: CHECKOUT.clone(),
        old_condition: "price >= 50 and coupon".to_string(),
        new_condition: "price >= 50 or coupon".to_string(),
    };
    let result = req.run().unwrap();

    assert_eq!(result.status, SimulationStatus::Changed);
    assert_eq!(result.line, Some(7));
    let modified = result.modified_structure.unwrap();
    assert!(modified.contains("elif price >= 50 or coupon:"));
    assert!(modified.contains("if price >= 100:"));
}

#[test]
fn test_simulate_parenthesized_source_guard() {
    let source = "def checkout(price):\n    if (price >= 100):\n        return (price * 0.9)\n    return price\n";
    let req = SimulateRequest {
        source_code: source.to_string(),
        old_condition: "price >= 100".to_string(),
        new_condition: "price > 100".to_string(),
    };
    let result = req.run().unwrap();

    assert_eq!(result.status, SimulationStatus::Changed);
    let original = result.original_structure.unwrap();
    assert!(original.contains("if price >= 100:"));
    assert!(original.contains("return price * 0.9"));

    let stale = SimulateRequest {
        old_condition: "(price >= 100)".to_string(),
        ..req
    };
    assert_eq!(stale.run().unwrap().status, SimulationStatus::NoMatch);
}

#[test]
fn test_extract_checkout() {
    let response = ExtractRequest {
        source_code: CHECKOUT.clone(),
    }
    .run()
    .unwrap();

    let rendered: Vec<String> = response.conditions.iter().map(|c| c.to_string()).collect();
    assert_eq!(rendered, vec!["age < 18", "price >= 100", "price >= 50"]);
    assert_eq!(
        response.structure.conditions,
        vec!["age < 18", "price >= 100", "price >= 50 and coupon"]
    );
    assert_eq!(
        response.structure.returns,
        vec![Some("\"blocked\"".to_string()), Some("total".to_string())]
    );
}

// ============================================================================
// Report and Server Tests
// ============================================================================

#[test]
fn test_report_envelope_serializes() {
    let report = Analyzer::default()
        .analyze(&request("price > 50", "price > 50"))
        .unwrap();
    let value = serde_json::to_value(ComplianceReport::new(report)).unwrap();

    assert_eq!(value["summary"]["status"], "PASS");
    assert_eq!(value["summary"]["risk_level"], "LOW");
    assert_eq!(value["summary"]["violation_count"], 0);
    assert_eq!(value["details"]["decision"]["decision"], "ALLOW");
    assert!(value["details"].get("simulation").is_none());
}

#[tokio::test]
async fn test_analyze_handler() {
    let state = AppState::new(Settings::default());
    let mut req = request("price >= 100", "price > 100");
    req.test_cases = vec![TestCase::new(100.0, json!(true))];

    let Ok(Json(envelope)) = server::analyze(State(state), Json(req)).await else {
        panic!("analysis failed");
    };
    assert_eq!(envelope.summary.status, Status::Fail);
    assert_eq!(envelope.summary.violation_count, 1);
}

#[tokio::test]
async fn test_simulate_handler_parse_error() {
    let state = AppState::new(Settings::default());
    let req = SimulateRequest {
        source_code: "if price >= :\n    pass\n".to_string(),
        old_condition: "price >= 100".to_string(),
        new_condition: "price > 100".to_string(),
    };

    let Err(err) = server::simulate(State(state), Json(req)).await else {
        panic!("expected parse error");
    };
    assert_eq!(err.into_response().status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_too_many_cases_rejected() {
    let mut settings = Settings::default();
    settings.limits.max_test_cases = 1;
    let state = AppState::new(settings);

    let mut req = request("x > 1", "x > 2");
    req.test_cases = vec![
        TestCase::new(1.0, json!(false)),
        TestCase::new(2.0, json!(true)),
    ];

    let result = server::analyze(State(state), Json(req)).await;
    let Err(err) = result else {
        panic!("expected admission failure");
    };
    assert_eq!(err.into_response().status(), axum::http::StatusCode::BAD_REQUEST);
}
