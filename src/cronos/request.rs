// SPDX-License-Identifier: MIT

//! Request types for the CLI and HTTP surfaces
//!
//! Requests are admitted against [`Limits`] before the engine sees them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cronos::config::Limits;
use crate::engine::condition::Condition;
use crate::engine::error::{AnalysisError, RequestError, Result};
use crate::engine::extract::{conditions_in, structure_in, CodeStructure};
use crate::engine::simulate::{simulate_change, SimulationResult};
use crate::engine::syntax::parse_python;
use crate::engine::AnalysisInput;

/// Full analysis request
pub type AnalyzeRequest = AnalysisInput;

/// What-if rewrite of a guard in a snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub source_code: String,
    pub old_condition: String,
    pub new_condition: String,
}

/// Condition and structure extraction from a snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub source_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub conditions: Vec<Condition>,
    pub structure: CodeStructure,
}

/// Checks a request against the configured limits
pub trait Admission {
    fn admit(&self, limits: &Limits) -> Result<(), RequestError>;
}

fn check_source(source: &str, limits: &Limits) -> Result<(), RequestError> {
    if source.len() > limits.max_source_bytes {
        return Err(RequestError::SourceTooLarge {
            size: source.len(),
            limit: limits.max_source_bytes,
        });
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), RequestError> {
    if value.trim().is_empty() {
        return Err(RequestError::MissingField(field.to_string()));
    }
    Ok(())
}

impl Admission for AnalysisInput {
    fn admit(&self, limits: &Limits) -> Result<(), RequestError> {
        require("old_condition", &self.old_condition)?;
        require("new_condition", &self.new_condition)?;
        if let Some(source) = &self.source_code {
            check_source(source, limits)?;
        }
        if self.test_cases.len() > limits.max_test_cases {
            return Err(RequestError::TooManyTestCases {
                count: self.test_cases.len(),
                limit: limits.max_test_cases,
            });
        }
        Ok(())
    }
}

impl Admission for SimulateRequest {
    fn admit(&self, limits: &Limits) -> Result<(), RequestError> {
        require("old_condition", &self.old_condition)?;
        require("new_condition", &self.new_condition)?;
        check_source(&self.source_code, limits)
    }
}

impl Admission for ExtractRequest {
    fn admit(&self, limits: &Limits) -> Result<(), RequestError> {
        check_source(&self.source_code, limits)
    }
}

impl SimulateRequest {
    pub fn run(&self) -> Result<SimulationResult, AnalysisError> {
        simulate_change(&self.source_code, &self.old_condition, &self.new_condition)
    }
}

impl ExtractRequest {
    pub fn run(&self) -> Result<ExtractResponse, AnalysisError> {
        let parsed = parse_python(&self.source_code)?;
        Ok(ExtractResponse {
            conditions: conditions_in(&parsed),
            structure: structure_in(&parsed),
        })
    }
}

/// Loads analysis requests from files
pub struct RequestLoader;

impl RequestLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a request from a `.json` file, or YAML for anything else
    pub fn load_request<P: AsRef<Path>>(&self, path: P) -> Result<AnalyzeRequest> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::parse_json(&content)
        } else {
            Self::parse_yaml(&content)
        }
    }

    pub fn parse_yaml(content: &str) -> Result<AnalyzeRequest> {
        let request: AnalyzeRequest = serde_yaml::from_str(content)?;
        Ok(request)
    }

    pub fn parse_json(content: &str) -> Result<AnalyzeRequest> {
        let request: AnalyzeRequest = serde_json::from_str(content)?;
        Ok(request)
    }
}

impl Default for RequestLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::CronosError;
    use crate::engine::simulate::SimulationStatus;
    use serde_json::json;

    #[test]
    fn test_parse_yaml_request() {
        let yaml = r#"
old_condition: "price >= 100"
new_condition: "price > 100"
source_code: |
  if price >= 100:
      discount = 10
test_cases:
  - input: [100]
    expected_output: true
  - input: [150]
    expected_output: true
constraints:
  no_behavior_change: true
simulate: true
"#;
        let req = RequestLoader::parse_yaml(yaml).unwrap();
        assert_eq!(req.old_condition, "price >= 100");
        assert_eq!(req.test_cases.len(), 2);
        assert_eq!(req.test_cases[0].input, vec![100.0]);
        assert_eq!(req.test_cases[0].expected_output, json!(true));
        assert!(req.constraints.no_behavior_change);
        assert!(req.simulate);
        assert!(req.source_code.unwrap().starts_with("if price >= 100:"));
    }

    #[test]
    fn test_parse_json_request_defaults() {
        let req = RequestLoader::parse_json(
            r#"{"old_condition": "age >= 18", "new_condition": "age >= 17"}"#,
        )
        .unwrap();
        assert!(req.source_code.is_none());
        assert!(req.test_cases.is_empty());
        assert!(!req.constraints.no_behavior_change);
        assert!(req.contracts.function_input.is_none());
    }

    #[test]
    fn test_missing_required_field() {
        assert!(matches!(
            RequestLoader::parse_json(r#"{"old_condition": "age >= 18"}"#),
            Err(CronosError::Json(_))
        ));
    }

    #[test]
    fn test_admission_limits() {
        let limits = Limits {
            max_source_bytes: 10,
            max_test_cases: 1,
        };

        let mut req = RequestLoader::parse_json(
            r#"{"old_condition": "x > 1", "new_condition": "x > 2", "source_code": "if x > 1:\n    pass\n"}"#,
        )
        .unwrap();
        assert!(matches!(
            req.admit(&limits),
            Err(RequestError::SourceTooLarge { limit: 10, .. })
        ));

        req.source_code = None;
        req.test_cases = vec![
            crate::engine::behavior::TestCase::new(1.0, json!(true)),
            crate::engine::behavior::TestCase::new(2.0, json!(true)),
        ];
        assert_eq!(
            req.admit(&limits),
            Err(RequestError::TooManyTestCases { count: 2, limit: 1 })
        );

        req.test_cases.truncate(1);
        assert!(req.admit(&limits).is_ok());
    }

    #[test]
    fn test_blank_condition_rejected() {
        let req = SimulateRequest {
            source_code: String::new(),
            old_condition: "  ".to_string(),
            new_condition: "x > 1".to_string(),
        };
        assert_eq!(
            req.admit(&Limits::default()),
            Err(RequestError::MissingField("old_condition".to_string()))
        );
    }

    #[test]
    fn test_simulate_request() {
        let req = SimulateRequest {
            source_code: "if x > 1:\n    y = 2\n".to_string(),
            old_condition: "x > 1".to_string(),
            new_condition: "x >= 1".to_string(),
        };
        let result = req.run().unwrap();
        assert_eq!(result.status, SimulationStatus::Changed);
    }

    #[test]
    fn test_extract_request() {
        let req = ExtractRequest {
            source_code: "def f(age):\n    if age >= 18:\n        return True\n    return False\n"
                .to_string(),
        };
        let response = req.run().unwrap();
        assert_eq!(response.conditions.len(), 1);
        assert_eq!(response.conditions[0].to_string(), "age >= 18");
        assert_eq!(response.structure.conditions, vec!["age >= 18"]);
        assert_eq!(response.structure.returns.len(), 2);
    }

    #[test]
    fn test_extract_request_parse_error() {
        let req = ExtractRequest {
            source_code: "if age >= 18\n    return True\n".to_string(),
        };
        assert!(matches!(req.run(), Err(AnalysisError::Parse { .. })));
    }
}
