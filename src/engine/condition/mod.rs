// SPDX-License-Identifier: MIT

//! Condition model for guard analysis
//!
//! Conditions are single comparisons like:
//! - `price > 100`
//! - `age >= 18`
//! - `retries != 3`

mod ast;
mod evaluator;
mod parser;

pub use ast::{CompareOp, Condition, Direction};
pub use evaluator::{evaluate, evaluate_condition, evaluate_symbol};
pub use parser::{parse_condition_text, parse_int_literal};
