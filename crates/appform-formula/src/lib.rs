//! # appform-formula
//!
//! AppSheet-style formula engine for appform.
//!
//! This crate provides:
//! - Tokenizing and parsing formula text into an AST, with a process-wide
//!   parse cache
//! - Evaluating ASTs against sample rows, including `[Ref].[Column]`
//!   dereferences and the LOOKUP/FILTER/SELECT family
//! - Computing every AppFormula column of a row by fixed-point iteration
//! - Static checks that flag unknown names and unsupported functions
//!
//! Evaluation is fail-soft: nothing here returns an error for a bad formula.
//! Unknown columns, unknown functions, non-numeric arithmetic and division
//! by zero all produce the empty string.
//!
//! ## Example
//!
//! ```rust
//! use appform_core::{row, Column, ColumnType, SampleData, Table, Value};
//! use appform_formula::{compute_row_with_formulas, evaluate_expression, EvaluationContext};
//!
//! let products = Table::new("products", "Products")
//!     .with_column(Column::new("pid", "Product ID", ColumnType::Text).with_key())
//!     .with_column(Column::new("price", "Price", ColumnType::Price))
//!     .with_column(Column::new("gross", "Gross", ColumnType::Price).with_formula("[Price] * 2"));
//! let tables = vec![products];
//! let data = SampleData::default();
//! let r = row([("pid", Value::from("P1")), ("price", Value::from(21.0))]);
//!
//! let computed = compute_row_with_formulas(&tables[0], &r, &tables, &data, None);
//! assert_eq!(computed["gross"], Value::from(42.0));
//!
//! let ctx = EvaluationContext::new(&tables, &data, &tables[0], &computed);
//! assert_eq!(evaluate_expression("[Gross] & \" yen\"", &ctx), Value::from("42 yen"));
//! ```

pub mod ast;
pub mod cache;
pub mod coerce;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod value;

pub use ast::{BinaryOperator, FormulaExpr, TableColumnRef, UnaryOperator};
pub use cache::{clear_parse_cache, parse_cache_len, parse_expression_cached, ParseCache};
pub use coerce::{as_string, is_blank, to_number, truthy};
pub use diagnostics::{check_formula, references_volatile};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_expression, EvaluationContext, DEFAULT_MAX_DEPTH};
pub use functions::{FunctionDef, FunctionRegistry};
pub use lexer::{normalize_input, tokenize, Token};
pub use parser::{parse, parse_formula, parse_formula_strict};
pub use resolver::{
    compute_row, compute_row_with_formulas, compute_row_with_options, same_value,
    ComputeOptions, DEFAULT_MAX_RECURSION_DEPTH,
};
pub use value::FormulaValue;
