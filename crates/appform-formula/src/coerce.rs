//! Value coercion rules
//!
//! Sample data is untyped, so every operator and function coerces its inputs
//! through these helpers. They are total: anything that cannot be coerced
//! falls back to blank / `None` / `false` instead of failing.

use std::cmp::Ordering;

use appform_core::{format_number, Value};

/// Placeholders that editors and old sample data use to mean "empty"
const BLANK_PLACEHOLDERS: [&str; 3] = ["-", "\u{2014}", "\u{2212}"];

/// True for null, whitespace-only text, and the dash placeholders
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_blank_text(s),
        other => is_blank_text(&other.raw_text()),
    }
}

/// Display string of a value.
///
/// Booleans render as `TRUE`/`FALSE`, numbers in shortest form, null as the
/// empty string, and lists as the `", "`-joined renderings of their
/// non-blank items.
pub fn as_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => bool_text(*b).to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::List(items) => list_as_string(items),
    }
}

/// Numeric value, if the value reads as a finite number.
///
/// Text is trimmed and thousands separators are dropped; the empty string and
/// the dash placeholders are not numbers (rather than zero).
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n).filter(|n| n.is_finite()),
        Value::Null => None,
        Value::String(s) => parse_number(s),
        other => parse_number(&other.raw_text()),
    }
}

/// Truthiness of a value
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::List(items) => !items.is_empty(),
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::String(s) => truthy_text(s),
    }
}

pub(crate) fn bool_text(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

pub(crate) fn is_blank_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || BLANK_PLACEHOLDERS.contains(&trimmed)
}

pub(crate) fn list_as_string(items: &[Value]) -> String {
    items
        .iter()
        .map(as_string)
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Loose `,`-joined rendering used for numeric and blank checks on lists
pub(crate) fn list_raw_text(items: &[Value]) -> String {
    items
        .iter()
        .map(Value::raw_text)
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn truthy_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    !matches!(trimmed.to_uppercase().as_str(), "FALSE" | "NO")
}

/// Parse numeric text: decimal (with exponent), or `0x`/`0o`/`0b` integers
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || BLANK_PLACEHOLDERS.contains(&cleaned.as_str()) {
        return None;
    }

    let radix = match cleaned.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&cleaned[2..], radix);
    }

    // Rust accepts spellings like "inf" and "NaN"; the finiteness filter
    // rejects those along with overflowing values
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
}

/// Compare two numbers; equal values (including `0` and `-0`) compare equal
pub(crate) fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Ordinal text comparison by UTF-16 code units
pub(crate) fn compare_text(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}
