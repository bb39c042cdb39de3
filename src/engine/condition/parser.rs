//! Textual condition parsing
//!
//! Parses free-form strings like:
//! - `age >= 18`
//! - `price > 100`
//! - `retries != 3`
//!
//! This is the fallback used when no syntax tree is available. The first
//! `identifier op integer` triple in the text wins.

use super::ast::{CompareOp, Condition};
use once_cell::sync::Lazy;
use regex::Regex;

static CONDITION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_]\w*)\s*(>=|<=|==|!=|>|<)\s*(-?\d[\d_]*)(?:$|[^\w.])")
        .expect("condition pattern is valid")
});

/// Extract one condition from a free-form string, or `None` if unparseable
pub fn parse_condition_text(text: &str) -> Option<Condition> {
    let caps = CONDITION_PATTERN.captures(text)?;
    let operator = CompareOp::from_symbol(&caps[2])?;
    let value = parse_int_literal(&caps[3])?;
    Some(Condition::new(&caps[1], operator, value))
}

/// Parse an integer literal as written in source.
///
/// Accepts `_` digit separators and `0x`/`0o`/`0b` prefixes. Returns `None`
/// for anything else, including values outside `i64`.
pub fn parse_int_literal(literal: &str) -> Option<i64> {
    let (negative, body) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let cleaned: String = body.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }

    let lower = cleaned.to_ascii_lowercase();
    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin, 2)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    // Wide enough that `i64::MIN` survives negation
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}
