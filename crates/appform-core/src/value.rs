//! Dynamically typed row values
//!
//! Sample rows carry whatever the editor stored: strings, numbers, booleans,
//! nulls and (for computed columns) lists. Values are never checked against
//! the declared column type; coercion happens when a formula reads them.

use std::fmt;

/// A value stored in a row or produced by a formula
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Missing value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all numbers are f64)
    Number(f64),
    /// String value
    String(String),
    /// List value (FILTER/SELECT results, EnumList cells)
    List(Vec<Value>),
}

impl Value {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        Value::String(s.into())
    }

    /// Create a list value
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if the value is a list
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Get the string slice if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the number if this is a numeric value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the items if this is a list value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Loose text rendering of the value.
    ///
    /// Booleans render lowercase, lists join their items with `,` and null
    /// renders as the empty string. This is the form used when matching Ref
    /// keys and when checking for blanks.
    pub fn raw_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::raw_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Trimmed [`raw_text`](Self::raw_text), used for key comparisons
    pub fn key_text(&self) -> String {
        match self {
            Value::String(s) => s.trim().to_string(),
            other => other.raw_text().trim().to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text())
    }
}

/// Render a number in its shortest round-trip form.
///
/// Integral values print without a fractional part, `-0` prints as `0`, and
/// magnitudes at or above `1e21` or below `1e-6` switch to exponent notation
/// (`1e+21`, `1.5e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e3"
    let sci = format!("{:e}", n.abs());
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return format!("{}", n),
    };
    let exponent: i32 = match exponent.parse() {
        Ok(e) => e,
        Err(_) => return format!("{}", n),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exponent + 1;

    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }

    if k <= point && point <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((point - k) as usize));
    } else if 0 < point && point <= 21 {
        out.push_str(&digits[..point as usize]);
        out.push('.');
        out.push_str(&digits[point as usize..]);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-point) as usize));
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if point - 1 >= 0 { '+' } else { '-' });
        out.push_str(&(point - 1).abs().to_string());
    }
    out
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
