// SPDX-License-Identifier: MIT

//! Static analysis engine for guard condition changes

pub mod analysis;
pub mod behavior;
pub mod condition;
pub mod contracts;
pub mod error;
pub mod explain;
pub mod extract;
pub mod gate;
pub mod score;
pub mod semantic;
pub mod simulate;
pub mod syntax;
pub mod types;

pub use analysis::{AnalysisInput, AnalysisReport, Analyzer, ContractSpec};
pub use error::{AnalysisError, CronosError, RequestError, Result};
pub use types::{Finding, RiskLevel, Status};
