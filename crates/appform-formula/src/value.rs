//! Values produced while evaluating a formula

use appform_core::{format_number, Value};

use crate::ast::TableColumnRef;
use crate::coerce;

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    /// Missing cell value
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    /// `Table[Column]` marker consumed by SELECT; renders as blank elsewhere
    TableColumn(TableColumnRef),
}

impl FormulaValue {
    /// The empty-string result used for every fail-soft path
    pub fn blank() -> Self {
        FormulaValue::String(String::new())
    }

    /// Display string (see [`coerce::as_string`])
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Null | FormulaValue::TableColumn(_) => String::new(),
            FormulaValue::Boolean(b) => coerce::bool_text(*b).to_string(),
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::List(items) => coerce::list_as_string(items),
        }
    }

    /// Numeric value, if any (see [`coerce::to_number`])
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            FormulaValue::String(s) => coerce::parse_number(s),
            FormulaValue::List(items) => coerce::parse_number(&coerce::list_raw_text(items)),
            FormulaValue::Null | FormulaValue::Boolean(_) | FormulaValue::TableColumn(_) => None,
        }
    }

    /// Blank check (see [`coerce::is_blank`])
    pub fn is_blank(&self) -> bool {
        match self {
            FormulaValue::Null | FormulaValue::TableColumn(_) => true,
            FormulaValue::Boolean(_) | FormulaValue::Number(_) => false,
            FormulaValue::String(s) => coerce::is_blank_text(s),
            FormulaValue::List(items) => coerce::is_blank_text(&coerce::list_raw_text(items)),
        }
    }

    /// Truthiness (see [`coerce::truthy`])
    pub fn truthy(&self) -> bool {
        match self {
            FormulaValue::Null => false,
            FormulaValue::Boolean(b) => *b,
            FormulaValue::Number(n) => *n != 0.0,
            FormulaValue::String(s) => coerce::truthy_text(s),
            FormulaValue::List(items) => !items.is_empty(),
            FormulaValue::TableColumn(_) => true,
        }
    }

    /// Convert into a row value; null and the table-column marker become `""`
    pub fn into_value(self) -> Value {
        match self {
            FormulaValue::Null | FormulaValue::TableColumn(_) => Value::String(String::new()),
            FormulaValue::Boolean(b) => Value::Bool(b),
            FormulaValue::Number(n) => Value::Number(n),
            FormulaValue::String(s) => Value::String(s),
            FormulaValue::List(items) => Value::List(items),
        }
    }
}

impl From<Value> for FormulaValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FormulaValue::Null,
            Value::Bool(b) => FormulaValue::Boolean(b),
            Value::Number(n) => FormulaValue::Number(n),
            Value::String(s) => FormulaValue::String(s),
            Value::List(items) => FormulaValue::List(items),
        }
    }
}

impl From<FormulaValue> for Value {
    fn from(value: FormulaValue) -> Self {
        value.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_renders_blank() {
        let marker = FormulaValue::TableColumn(TableColumnRef {
            table: "Items".into(),
            column: "Name".into(),
        });
        assert_eq!(marker.as_string(), "");
        assert!(marker.is_blank());
        assert!(marker.truthy());
        assert_eq!(marker.into_value(), Value::from(""));
    }

    #[test]
    fn test_coercions_match_row_values() {
        let samples = vec![
            Value::Null,
            Value::from(true),
            Value::from(0.0),
            Value::from(12.5),
            Value::from(" 1,000 "),
            Value::from("no"),
            Value::from("-"),
            Value::list(["a", "", "b"]),
            Value::List(vec![]),
        ];

        for v in samples {
            let fv = FormulaValue::from(v.clone());
            assert_eq!(fv.as_string(), coerce::as_string(&v), "as_string {:?}", v);
            assert_eq!(fv.as_number(), coerce::to_number(&v), "as_number {:?}", v);
            assert_eq!(fv.is_blank(), coerce::is_blank(&v), "is_blank {:?}", v);
            assert_eq!(fv.truthy(), coerce::truthy(&v), "truthy {:?}", v);
        }
    }

    #[test]
    fn test_null_becomes_empty_string() {
        assert_eq!(Value::from(FormulaValue::Null), Value::from(""));
        assert_eq!(Value::from(FormulaValue::Number(3.0)), Value::from(3.0));
    }
}
