//! JSON report envelope
//!
//! Wraps an [`AnalysisReport`] with identifying metadata and a short summary
//! for downstream compliance tooling.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{AnalysisReport, RiskLevel, Status};

pub const ENGINE_NAME: &str = "cronos static condition analyzer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub report_id: String,
    /// RFC 3339, UTC
    pub generated_at: String,
    pub engine: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub status: Status,
    pub risk_level: RiskLevel,
    pub violation_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub report_metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub details: AnalysisReport,
}

impl ComplianceReport {
    pub fn new(details: AnalysisReport) -> Self {
        Self::at(details, Utc::now())
    }

    /// Build a report stamped with a fixed time
    pub fn at(details: AnalysisReport, generated_at: DateTime<Utc>) -> Self {
        Self {
            report_metadata: ReportMetadata {
                report_id: Uuid::new_v4().to_string(),
                generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                engine: ENGINE_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            summary: ReportSummary {
                status: details.status,
                risk_level: details.risk_level,
                violation_count: details.verdict.violations.len(),
            },
            details,
        }
    }
}
