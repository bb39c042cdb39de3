// SPDX-License-Identifier: MIT

//! Value types for single-variable integer comparisons

use serde::{Deserialize, Serialize};

/// A `variable op constant` comparison taken from source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub variable: String,
    pub operator: CompareOp,
    pub value: i64,
    /// 1-based line in the source the condition was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<usize>,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// >
    #[serde(rename = ">")]
    Gt,
    /// >=
    #[serde(rename = ">=")]
    Gte,
    /// <
    #[serde(rename = "<")]
    Lt,
    /// <=
    #[serde(rename = "<=")]
    Lte,
    /// ==
    #[serde(rename = "==")]
    Eq,
    /// !=
    #[serde(rename = "!=")]
    NotEq,
}

/// Accept/reject orientation of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Gt,
    Lt,
    Eq,
}

impl Condition {
    pub fn new(variable: impl Into<String>, operator: CompareOp, value: i64) -> Self {
        Self {
            variable: variable.into(),
            operator,
            value,
            source_line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Gt,
        CompareOp::Gte,
        CompareOp::Lt,
        CompareOp::Lte,
        CompareOp::Eq,
        CompareOp::NotEq,
    ];

    /// Map a source token to an operator. Anything outside the six forms is `None`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Gte),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Lte),
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::NotEq),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
        }
    }

    /// `!=` has no orientation.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            CompareOp::Gt | CompareOp::Gte => Some(Direction::Gt),
            CompareOp::Lt | CompareOp::Lte => Some(Direction::Lt),
            CompareOp::Eq => Some(Direction::Eq),
            CompareOp::NotEq => None,
        }
    }

    /// True for the forms that accept the threshold itself
    pub fn includes_equality(&self) -> bool {
        matches!(self, CompareOp::Gte | CompareOp::Lte | CompareOp::Eq)
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.variable, self.operator, self.value)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Gt => write!(f, "gt"),
            Direction::Lt => write!(f, "lt"),
            Direction::Eq => write!(f, "eq"),
        }
    }
}
