//! Condition evaluation against a concrete value

use std::cmp::Ordering;

use super::ast::{CompareOp, Condition};

/// Evaluate `value <op> threshold`.
///
/// The comparison is exact for every `i64` threshold, including ones beyond
/// 2^53 that `f64` cannot represent. `NaN` satisfies no operator.
pub fn evaluate(op: CompareOp, threshold: i64, value: f64) -> bool {
    let Some(ordering) = compare_to_threshold(value, threshold) else {
        return false;
    };
    match op {
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::NotEq => ordering != Ordering::Equal,
    }
}

/// Order `value` against an integer without rounding the integer
fn compare_to_threshold(value: f64, threshold: i64) -> Option<Ordering> {
    if value.is_nan() {
        return None;
    }
    // saturating; infinities land past every i64
    let whole = value.floor() as i128;
    match whole.cmp(&i128::from(threshold)) {
        Ordering::Equal if value.fract() != 0.0 => Some(Ordering::Greater),
        ordering => Some(ordering),
    }
}

/// Evaluate a raw operator token. Unknown operators evaluate to `false`.
pub fn evaluate_symbol(symbol: &str, threshold: i64, value: f64) -> bool {
    CompareOp::from_symbol(symbol)
        .map(|op| evaluate(op, threshold, value))
        .unwrap_or(false)
}

/// Evaluate a condition against the value of its variable
pub fn evaluate_condition(cond: &Condition, value: f64) -> bool {
    evaluate(cond.operator, cond.value, value)
}
