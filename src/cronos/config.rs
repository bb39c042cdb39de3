//! Service settings
//!
//! Settings come from an optional YAML file and are then overridden by
//! `CRONOS_*` environment variables. Every field has a default, so an empty
//! file (or none at all) is valid.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::error::{CronosError, Result};
use crate::engine::explain::default_domains;
use crate::engine::score::{RiskScorer, DEFAULT_SENSITIVE_VARIABLES};
use crate::engine::Analyzer;

pub const ENV_PORT: &str = "CRONOS_PORT";
pub const ENV_MAX_SOURCE_BYTES: &str = "CRONOS_MAX_SOURCE_BYTES";
pub const ENV_MAX_TEST_CASES: &str = "CRONOS_MAX_TEST_CASES";
pub const ENV_SENSITIVE_VARIABLES: &str = "CRONOS_SENSITIVE_VARIABLES";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub limits: Limits,
    pub scoring: ScoringSettings,
    pub explain: ExplainSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
}

/// Admission limits applied before a request reaches the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_source_bytes: usize,
    pub max_test_cases: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub sensitive_variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainSettings {
    /// Variable name → business domain
    pub domains: BTreeMap<String, String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_source_bytes: 64 * 1024,
            max_test_cases: 1000,
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            sensitive_variables: DEFAULT_SENSITIVE_VARIABLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for ExplainSettings {
    fn default() -> Self {
        Self {
            domains: default_domains(),
        }
    }
}

impl Settings {
    /// Build an analyzer configured by these settings
    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(
            RiskScorer::new(self.scoring.sensitive_variables.iter().cloned()),
            self.explain.domains.clone(),
        )
    }
}

/// Loads [`Settings`] from YAML and the environment
pub struct SettingsLoader;

impl SettingsLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load settings from an optional file, then apply process env overrides
    pub fn load<P: AsRef<Path>>(&self, path: Option<P>) -> Result<Settings> {
        let settings = match path {
            Some(path) => {
                let path = path.as_ref();
                log::info!("Loading settings from {}", path.display());
                let content = fs::read_to_string(path)?;
                Self::parse_yaml(&content)?
            }
            None => Settings::default(),
        };
        Self::apply_env(settings, |key| std::env::var(key).ok())
    }

    /// Parse settings from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Settings> {
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Override fields from `CRONOS_*` variables read through `lookup`
    pub fn apply_env<F>(mut settings: Settings, lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            settings.server.port = parse_var(ENV_PORT, &port)?;
        }
        if let Some(bytes) = lookup(ENV_MAX_SOURCE_BYTES) {
            settings.limits.max_source_bytes = parse_var(ENV_MAX_SOURCE_BYTES, &bytes)?;
        }
        if let Some(count) = lookup(ENV_MAX_TEST_CASES) {
            settings.limits.max_test_cases = parse_var(ENV_MAX_TEST_CASES, &count)?;
        }
        if let Some(list) = lookup(ENV_SENSITIVE_VARIABLES) {
            settings.scoring.sensitive_variables = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CronosError::config(format!("{} has invalid value '{}'", key, value)))
}
