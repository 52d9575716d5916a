//! Formula evaluator
//!
//! Walks formula ASTs against a row of sample data. Evaluation is fail-soft:
//! a subtree that cannot be evaluated yields the empty string and the rest
//! of the formula carries on (`"Total: " & (1/0)` is `"Total: "`).

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::OnceLock;

use appform_core::{find_row_by_key, rows_for, table_by_id, Column, Row, SampleData, Table, Value};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::cache::parse_expression_cached;
use crate::coerce;
use crate::functions::FunctionRegistry;
use crate::resolver::compute_row;
use crate::value::FormulaValue;

/// Default limit for `[A].[B]...` dereference hops and nested row computation
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

pub(crate) fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Context for formula evaluation
///
/// Cheap to copy: everything is borrowed from the caller. Nested evaluations
/// (a referenced row, a FILTER predicate) derive a new context rather than
/// mutating this one.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Every table of the project
    pub tables: &'a [Table],
    /// Sample rows of every table
    pub sample_data: &'a SampleData,
    /// Table of the row being evaluated
    pub table: &'a Table,
    /// Row being evaluated
    pub row: &'a Row,
    /// Outer table while evaluating a FILTER/SELECT predicate (`[_THISROW]`)
    pub this_table: Option<&'a Table>,
    /// Outer row while evaluating a FILTER/SELECT predicate (`[_THISROW]`)
    pub this_row: Option<&'a Row>,
    /// Instant reported by NOW() and TODAY()
    pub now: DateTime<Utc>,
    /// Maximum number of Ref hops in one column path
    pub max_deref_depth: usize,
    /// Current nesting of row computations
    pub recursion_depth: usize,
    /// Nesting beyond which referenced rows are used without computing them
    pub max_recursion_depth: usize,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context for `row` of `table`, using the current time
    pub fn new(
        tables: &'a [Table],
        sample_data: &'a SampleData,
        table: &'a Table,
        row: &'a Row,
    ) -> Self {
        Self {
            tables,
            sample_data,
            table,
            row,
            this_table: None,
            this_row: None,
            now: Utc::now(),
            max_deref_depth: DEFAULT_MAX_DEPTH,
            recursion_depth: 0,
            max_recursion_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Pin the instant used by NOW() and TODAY()
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Set the outer row that `[_THISROW]` refers to
    pub fn with_this_row(mut self, table: &'a Table, row: &'a Row) -> Self {
        self.this_table = Some(table);
        self.this_row = Some(row);
        self
    }

    /// Limit the number of Ref hops in one column path
    pub fn with_max_deref_depth(mut self, depth: usize) -> Self {
        self.max_deref_depth = depth;
        self
    }

    /// Set the row-computation nesting depth and its limit
    pub fn with_recursion(mut self, depth: usize, max_depth: usize) -> Self {
        self.recursion_depth = depth;
        self.max_recursion_depth = max_depth;
        self
    }

    /// Context for evaluating a predicate against `row` of `table`.
    ///
    /// `[_THISROW]` points back at the row of this context, and the
    /// recursion depth grows by one.
    pub fn scoped<'b>(&self, table: &'b Table, row: &'b Row) -> EvaluationContext<'b>
    where
        'a: 'b,
    {
        EvaluationContext {
            tables: self.tables,
            sample_data: self.sample_data,
            table,
            row,
            this_table: Some(self.table),
            this_row: Some(self.row),
            now: self.now,
            max_deref_depth: self.max_deref_depth,
            recursion_depth: self.recursion_depth + 1,
            max_recursion_depth: self.max_recursion_depth,
        }
    }

    /// Compute the formulas of `row` (a row of `table`) one level deeper
    pub fn compute_nested(&self, table: &Table, row: &Row) -> Row {
        compute_row(
            table,
            row,
            self.tables,
            self.sample_data,
            self.now,
            self.recursion_depth + 1,
            self.max_recursion_depth,
        )
    }
}

/// Evaluate formula text against a context.
///
/// Never fails: null results and anything unusable come back as `""`.
///
/// # Example
/// ```rust
/// use appform_core::{row, Column, ColumnType, SampleData, Table, Value};
/// use appform_formula::{evaluate_expression, EvaluationContext};
///
/// let table = Table::new("t", "People").with_column(Column::new("name", "Name", ColumnType::Name));
/// let tables = vec![table];
/// let data = SampleData::default();
/// let r = row([("name", "Alice")]);
/// let ctx = EvaluationContext::new(&tables, &data, &tables[0], &r);
///
/// assert_eq!(evaluate_expression("\"Hi \" & [Name]", &ctx), Value::from("Hi Alice"));
/// assert_eq!(evaluate_expression("10 / 0", &ctx), Value::from(""));
/// ```
pub fn evaluate_expression(text: &str, ctx: &EvaluationContext) -> Value {
    let ast = parse_expression_cached(text);
    evaluate(&ast, ctx).into_value()
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaValue {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => FormulaValue::Number(*n),
        FormulaExpr::String(s) => FormulaValue::String(s.clone()),
        FormulaExpr::Boolean(b) => FormulaValue::Boolean(*b),
        FormulaExpr::Blank => FormulaValue::blank(),

        // === References ===
        FormulaExpr::ColumnRef(path) => evaluate_column_path(path, ctx),
        FormulaExpr::TableColumnRef(r) => FormulaValue::TableColumn(r.clone()),

        // === Operators ===
        FormulaExpr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, ctx),
        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Resolve `[A].[B].[C]`: read `A` on the current row, follow it as a Ref
/// to the referenced row (computing that row's formulas first), and so on.
fn evaluate_column_path(path: &[String], ctx: &EvaluationContext) -> FormulaValue {
    let (mut table, mut row, path): (&Table, Cow<'_, Row>, &[String]) = match path.split_first() {
        Some((first, rest)) if first.eq_ignore_ascii_case("_THISROW") => {
            match (ctx.this_table, ctx.this_row) {
                (Some(t), Some(r)) if !rest.is_empty() => (t, Cow::Borrowed(r), rest),
                _ => return FormulaValue::blank(),
            }
        }
        Some(_) => (ctx.table, Cow::Borrowed(ctx.row), path),
        None => return FormulaValue::blank(),
    };

    let hops = path.len() - 1;
    if hops > ctx.max_deref_depth {
        debug!(
            hops,
            limit = ctx.max_deref_depth,
            "column path exceeds dereference limit"
        );
        return FormulaValue::blank();
    }

    for (i, name) in path.iter().enumerate() {
        let column = match table.column_by_name(name) {
            Some(c) => c,
            None => return FormulaValue::blank(),
        };
        let value = row.get(&column.id).cloned().unwrap_or_default();

        if i == hops {
            return value.into();
        }

        match follow_ref(column, &value, ctx) {
            Some((target, target_row)) => {
                table = target;
                row = Cow::Owned(target_row);
            }
            None => return FormulaValue::blank(),
        }
    }

    FormulaValue::blank()
}

/// Follow a Ref value to the referenced row, computed one level deeper
fn follow_ref<'a>(
    column: &Column,
    value: &Value,
    ctx: &EvaluationContext<'a>,
) -> Option<(&'a Table, Row)> {
    let target = table_by_id(ctx.tables, column.ref_table_id()?)?;
    let key_column = column
        .constraints
        .ref_column_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or_else(|| target.key_column_id())?;

    let key = value.key_text();
    if key.is_empty() {
        return None;
    }

    let raw = find_row_by_key(rows_for(ctx.sample_data, &target.id), key_column, &key)?;
    Some((target, ctx.compute_nested(target, raw)))
}

/// Evaluate a unary operation; non-numeric operands count as 0
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaValue {
    let n = evaluate(operand, ctx).as_number().unwrap_or(0.0);
    match op {
        UnaryOperator::Plus => FormulaValue::Number(n),
        UnaryOperator::Negate => FormulaValue::Number(-n),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaValue {
    let left_val = evaluate(left, ctx);
    let right_val = evaluate(right, ctx);

    match op {
        BinaryOperator::Concat => {
            FormulaValue::String(left_val.as_string() + &right_val.as_string())
        }

        // Arithmetic: both sides must be numeric, otherwise blank
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide => {
            let (l, r) = match (left_val.as_number(), right_val.as_number()) {
                (Some(l), Some(r)) => (l, r),
                _ => return FormulaValue::blank(),
            };
            match op {
                BinaryOperator::Add => FormulaValue::Number(l + r),
                BinaryOperator::Subtract => FormulaValue::Number(l - r),
                BinaryOperator::Multiply => FormulaValue::Number(l * r),
                _ if r == 0.0 => FormulaValue::blank(),
                _ => FormulaValue::Number(l / r),
            }
        }

        BinaryOperator::Equal => FormulaValue::Boolean(compare_values(&left_val, &right_val).is_eq()),
        BinaryOperator::NotEqual => {
            FormulaValue::Boolean(compare_values(&left_val, &right_val).is_ne())
        }
        BinaryOperator::LessThan => {
            FormulaValue::Boolean(compare_values(&left_val, &right_val).is_lt())
        }
        BinaryOperator::LessEqual => {
            FormulaValue::Boolean(compare_values(&left_val, &right_val).is_le())
        }
        BinaryOperator::GreaterThan => {
            FormulaValue::Boolean(compare_values(&left_val, &right_val).is_gt())
        }
        BinaryOperator::GreaterEqual => {
            FormulaValue::Boolean(compare_values(&left_val, &right_val).is_ge())
        }
    }
}

/// Numeric comparison when both sides read as numbers, otherwise ordinal
/// comparison of the trimmed display strings
pub(crate) fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Ordering {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => coerce::compare_numbers(l, r),
        _ => coerce::compare_text(left.as_string().trim(), right.as_string().trim()),
    }
}

/// Evaluate a function call; unknown functions yield blank
fn evaluate_function(name: &str, args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    match get_function_registry().get(name) {
        Some(def) => (def.implementation)(args, ctx),
        None => {
            debug!(function = name, "unknown function evaluates to blank");
            FormulaValue::blank()
        }
    }
}
