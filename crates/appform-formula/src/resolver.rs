//! Row formula resolver
//!
//! Fills in the AppFormula columns of a row. There is no dependency graph:
//! every formula is re-evaluated in column order, against the row as
//! computed so far, until a pass changes nothing or the pass cap is hit.

use appform_core::{Row, SampleData, Table, Value};
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::evaluator::{evaluate_expression, EvaluationContext, DEFAULT_MAX_DEPTH};

/// Default nesting limit for row computations started by Ref dereferences,
/// LOOKUP, FILTER and SELECT
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = DEFAULT_MAX_DEPTH;

/// Fewest and most fixed-point passes over a row's formulas
const MIN_PASSES: usize = 2;
const MAX_PASSES: usize = 8;

/// Row computation options
#[derive(Debug, Clone, Copy)]
pub struct ComputeOptions {
    /// Instant for NOW() and TODAY(); `None` reads the clock once per call
    pub now: Option<DateTime<Utc>>,
    /// Nesting limit for rows computed on behalf of other rows
    pub max_recursion_depth: usize,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            now: None,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

impl ComputeOptions {
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }
}

/// Compute `row` (a row of `table`) with default options
///
/// # Example
/// ```rust
/// use appform_core::{row, Column, ColumnType, SampleData, Table, Value};
/// use appform_formula::compute_row_with_formulas;
///
/// let orders = Table::new("orders", "Orders")
///     .with_column(Column::new("qty", "Quantity", ColumnType::Number))
///     .with_column(Column::new("price", "Price", ColumnType::Price))
///     .with_column(Column::new("total", "Total", ColumnType::Price).with_formula("[Quantity] * [Price]"));
/// let tables = vec![orders];
/// let data = SampleData::default();
///
/// let computed = compute_row_with_formulas(
///     &tables[0],
///     &row([("qty", 3.0), ("price", 100.0)]),
///     &tables,
///     &data,
///     None,
/// );
/// assert_eq!(computed["total"], Value::from(300.0));
/// ```
pub fn compute_row_with_formulas(
    table: &Table,
    row: &Row,
    tables: &[Table],
    sample_data: &SampleData,
    now: Option<DateTime<Utc>>,
) -> Row {
    compute_row_with_options(
        table,
        row,
        tables,
        sample_data,
        ComputeOptions {
            now,
            ..ComputeOptions::default()
        },
    )
}

/// Compute `row` (a row of `table`) at the top level
pub fn compute_row_with_options(
    table: &Table,
    row: &Row,
    tables: &[Table],
    sample_data: &SampleData,
    options: ComputeOptions,
) -> Row {
    let now = options.now.unwrap_or_else(Utc::now);
    compute_row(
        table,
        row,
        tables,
        sample_data,
        now,
        0,
        options.max_recursion_depth,
    )
}

/// Compute the formula columns of `row` at a given nesting depth.
///
/// Past `max_recursion_depth` the row comes back unchanged, which is what
/// stops circular Ref and formula graphs. Non-formula values are always
/// carried over as they are.
pub fn compute_row(
    table: &Table,
    row: &Row,
    tables: &[Table],
    sample_data: &SampleData,
    now: DateTime<Utc>,
    recursion_depth: usize,
    max_recursion_depth: usize,
) -> Row {
    if recursion_depth > max_recursion_depth {
        debug!(
            table = %table.id,
            depth = recursion_depth,
            limit = max_recursion_depth,
            "recursion limit reached; returning row without computing formulas"
        );
        return row.clone();
    }

    let formulas: Vec<(&str, &str)> = table
        .formula_columns()
        .filter_map(|c| Some((c.id.as_str(), c.app_formula()?)))
        .collect();
    if formulas.is_empty() {
        return row.clone();
    }

    let mut out = row.clone();
    let passes = formulas.len().clamp(MIN_PASSES, MAX_PASSES);

    for pass in 0..passes {
        let mut changed = false;

        for &(column_id, formula) in &formulas {
            let next = {
                let ctx = EvaluationContext::new(tables, sample_data, table, &out)
                    .with_now(now)
                    .with_max_deref_depth(max_recursion_depth)
                    .with_recursion(recursion_depth, max_recursion_depth);
                evaluate_expression(formula, &ctx)
            };

            if !same_value(out.get(column_id), &next) {
                out.insert(column_id.to_string(), next);
                changed = true;
            }
        }

        if !changed {
            trace!(table = %table.id, passes = pass + 1, "row formulas settled");
            break;
        }
    }

    out
}

/// Change test between passes.
///
/// Scalars compare by value, except that `NaN` equals itself and `0` differs
/// from `-0`. A freshly computed list never equals the previous one, and a
/// column without a previous value always counts as changed.
pub fn same_value(previous: Option<&Value>, next: &Value) -> bool {
    match (previous, next) {
        (Some(Value::Null), Value::Null) => true,
        (Some(Value::Bool(a)), Value::Bool(b)) => a == b,
        (Some(Value::String(a)), Value::String(b)) => a == b,
        (Some(Value::Number(a)), Value::Number(b)) => {
            (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appform_core::{row, Column, ColumnType};
    use pretty_assertions::assert_eq;

    fn orders() -> Table {
        Table::new("orders", "Orders")
            .with_column(Column::new("id", "ID", ColumnType::Text).with_key())
            .with_column(Column::new("price", "Price", ColumnType::Price))
            .with_column(Column::new("qty", "Quantity", ColumnType::Number))
            .with_column(
                Column::new("total", "Total", ColumnType::Price)
                    .with_virtual()
                    .with_formula("[Price] * [Quantity]"),
            )
    }

    #[test]
    fn test_computes_formula_columns() {
        let tables = vec![orders()];
        let data = SampleData::default();
        let r = row([
            ("id", Value::from("O1")),
            ("price", Value::from(100.0)),
            ("qty", Value::from(3.0)),
        ]);

        let out = compute_row_with_formulas(&tables[0], &r, &tables, &data, None);
        assert_eq!(out["total"], Value::from(300.0));
        assert_eq!(out["id"], Value::from("O1"));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_formula_overwrites_stored_value() {
        let tables = vec![orders()];
        let data = SampleData::default();
        let r = row([
            ("price", Value::from(2.0)),
            ("qty", Value::from(5.0)),
            ("total", Value::from("stale")),
        ]);
        let out = compute_row_with_formulas(&tables[0], &r, &tables, &data, None);
        assert_eq!(out["total"], Value::from(10.0));
    }

    #[test]
    fn test_chained_formulas_converge() {
        // C is declared before the B it depends on, so the first pass sees
        // a blank B; the second pass picks up the fresh value.
        let table = Table::new("t", "Chain")
            .with_column(Column::new("a", "A", ColumnType::Number))
            .with_column(Column::new("c", "C", ColumnType::Number).with_formula("[B] * 2"))
            .with_column(Column::new("b", "B", ColumnType::Number).with_formula("[A] + 1"));
        let tables = vec![table];
        let data = SampleData::default();
        let r = row([("a", 1.0)]);

        let out = compute_row_with_formulas(&tables[0], &r, &tables, &data, None);
        assert_eq!(out["b"], Value::from(2.0));
        assert_eq!(out["c"], Value::from(4.0));
    }

    #[test]
    fn test_chain_in_declaration_order() {
        let table = Table::new("t", "Chain")
            .with_column(Column::new("a", "A", ColumnType::Number))
            .with_column(Column::new("b", "B", ColumnType::Number).with_formula("[A] * 2"))
            .with_column(Column::new("c", "C", ColumnType::Text).with_formula("\"Result: \" & [B]"));
        let tables = vec![table];
        let data = SampleData::default();

        let out = compute_row_with_formulas(&tables[0], &row([("a", 5.0)]), &tables, &data, None);
        assert_eq!(out["b"], Value::from(10.0));
        assert_eq!(out["c"], Value::from("Result: 10"));
    }

    #[test]
    fn test_long_chain_stops_at_pass_cap() {
        // Nine formulas declared in reverse dependency order need nine
        // passes; only eight run, so the last link stays blank.
        let mut table = Table::new("t", "Chain").with_column(Column::new("f0", "F0", ColumnType::Number));
        for i in (1..=9).rev() {
            table = table.with_column(
                Column::new(format!("f{}", i), format!("F{}", i), ColumnType::Number)
                    .with_formula(format!("[F{}] + 1", i - 1)),
            );
        }
        let tables = vec![table];
        let data = SampleData::default();
        let r = row([("f0", 0.0)]);

        let out = compute_row_with_formulas(&tables[0], &r, &tables, &data, None);
        assert_eq!(out["f1"], Value::from(1.0));
        assert_eq!(out["f8"], Value::from(8.0));
        assert_eq!(out["f9"], Value::from(""));
    }

    #[test]
    fn test_row_without_formulas_is_unchanged() {
        let table = Table::new("t", "Plain").with_column(Column::new("a", "A", ColumnType::Text));
        let tables = vec![table];
        let data = SampleData::default();
        let r = row([("a", "x"), ("extra", "kept")]);
        assert_eq!(compute_row_with_formulas(&tables[0], &r, &tables, &data, None), r);
    }

    #[test]
    fn test_depth_exceeded_returns_row_unchanged() {
        let tables = vec![orders()];
        let data = SampleData::default();
        let r = row([("price", 1.0), ("qty", 1.0)]);
        let out = compute_row(&tables[0], &r, &tables, &data, Utc::now(), 6, 5);
        assert_eq!(out, r);
        assert!(!out.contains_key("total"));

        let out = compute_row(&tables[0], &r, &tables, &data, Utc::now(), 5, 5);
        assert_eq!(out["total"], Value::from(1.0));
    }

    #[test]
    fn test_same_value() {
        assert!(same_value(Some(&Value::from("a")), &Value::from("a")));
        assert!(!same_value(Some(&Value::from("a")), &Value::from("b")));
        assert!(same_value(Some(&Value::from(f64::NAN)), &Value::from(f64::NAN)));
        assert!(!same_value(Some(&Value::from(0.0)), &Value::from(-0.0)));
        assert!(!same_value(Some(&Value::from(1.0)), &Value::from("1")));
        assert!(!same_value(None, &Value::from("")));
        assert!(!same_value(Some(&Value::list(["x"])), &Value::list(["x"])));
    }

    #[test]
    fn test_list_results_settle_at_pass_cap() {
        let table = Table::new("t", "Lists")
            .with_column(Column::new("k", "Key", ColumnType::Text).with_key())
            .with_column(
                Column::new("keys", "Keys", ColumnType::EnumList).with_formula("FILTER(\"Lists\", TRUE)"),
            );
        let tables = vec![table];
        let mut data = SampleData::default();
        data.insert(
            "t".into(),
            vec![row([("k", "one")]), row([("k", "two")])],
        );
        let r = data["t"][0].clone();

        let out = compute_row_with_formulas(&tables[0], &r, &tables, &data, None);
        assert_eq!(out["keys"], Value::list(["one", "two"]));
    }
}
