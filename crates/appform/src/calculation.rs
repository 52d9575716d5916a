//! Project calculation
//!
//! Table-level entry points over the row resolver: compute every sample row
//! of a table, evaluate an ad-hoc expression against one row, and check all
//! AppFormulas of a project.
//!
//! # Example
//!
//! ```rust
//! use appform::prelude::*;
//!
//! let project = Project::new()
//!     .with_table(
//!         Table::new("t", "Tasks")
//!             .with_column(Column::new("title", "Title", ColumnType::Text).with_key())
//!             .with_column(Column::new("flag", "Flag", ColumnType::Text).with_formula("[Titel] & \"!\"")),
//!     );
//!
//! let findings = project.check_formulas();
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].to_string(), "Tasks.Flag: Unknown column: Titel");
//! ```

use std::fmt;

use appform_formula::{compute_row, evaluate_expression};
use chrono::{DateTime, Utc};

use crate::{
    check_formula, ComputeOptions, EvaluationContext, FormulaError, Project, Result, Row, Table,
    Value,
};

/// A problem found in one AppFormula of a project
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaDiagnostic {
    pub table_id: String,
    pub table_name: String,
    pub column_id: String,
    pub column_name: String,
    pub formula: String,
    pub error: FormulaError,
}

impl fmt::Display for FormulaDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.table_name, self.column_name, self.error)
    }
}

/// Extension trait for Project to add calculation methods
///
/// Tables may be named by id or by display name.
pub trait ProjectCalculationExt {
    /// Compute every sample row of a table with default options
    fn compute_table(&self, table: &str) -> Result<Vec<Row>>;

    /// Compute every sample row of a table with custom options
    fn compute_table_with_options(&self, table: &str, options: &ComputeOptions)
        -> Result<Vec<Row>>;

    /// Compute a single sample row
    fn compute_row(&self, table: &str, index: usize, options: &ComputeOptions) -> Result<Row>;

    /// Evaluate an expression against a computed sample row
    fn evaluate(&self, table: &str, index: usize, expression: &str) -> Result<Value>;

    /// Evaluate an expression against a computed sample row with custom options
    fn evaluate_with_options(
        &self,
        table: &str,
        index: usize,
        expression: &str,
        options: &ComputeOptions,
    ) -> Result<Value>;

    /// Check every AppFormula in the project
    fn check_formulas(&self) -> Vec<FormulaDiagnostic>;
}

impl ProjectCalculationExt for Project {
    fn compute_table(&self, table: &str) -> Result<Vec<Row>> {
        self.compute_table_with_options(table, &ComputeOptions::default())
    }

    fn compute_table_with_options(
        &self,
        table: &str,
        options: &ComputeOptions,
    ) -> Result<Vec<Row>> {
        let table = self.resolve_table(table)?;
        let calc = Calculation::new(self, options);
        let rows = self
            .rows(&table.id)
            .iter()
            .map(|row| calc.compute(table, row))
            .collect::<Vec<_>>();

        tracing::debug!(table = %table.id, rows = rows.len(), "computed table");
        Ok(rows)
    }

    fn compute_row(&self, table: &str, index: usize, options: &ComputeOptions) -> Result<Row> {
        let table = self.resolve_table(table)?;
        let row = self.row(&table.id, index)?;
        Ok(Calculation::new(self, options).compute(table, row))
    }

    fn evaluate(&self, table: &str, index: usize, expression: &str) -> Result<Value> {
        self.evaluate_with_options(table, index, expression, &ComputeOptions::default())
    }

    fn evaluate_with_options(
        &self,
        table: &str,
        index: usize,
        expression: &str,
        options: &ComputeOptions,
    ) -> Result<Value> {
        let table = self.resolve_table(table)?;
        let row = self.row(&table.id, index)?;
        let calc = Calculation::new(self, options);
        let computed = calc.compute(table, row);

        let ctx = EvaluationContext::new(&self.tables, &self.sample_data, table, &computed)
            .with_now(calc.now)
            .with_max_deref_depth(calc.max_depth)
            .with_recursion(0, calc.max_depth);
        Ok(evaluate_expression(expression, &ctx))
    }

    fn check_formulas(&self) -> Vec<FormulaDiagnostic> {
        let mut findings = Vec::new();

        for table in &self.tables {
            for column in table.formula_columns() {
                let Some(formula) = column.app_formula() else {
                    continue;
                };
                findings.extend(check_formula(formula, table, &self.tables).into_iter().map(
                    |error| FormulaDiagnostic {
                        table_id: table.id.clone(),
                        table_name: table.name.clone(),
                        column_id: column.id.clone(),
                        column_name: column.name.clone(),
                        formula: formula.to_string(),
                        error,
                    },
                ));
            }
        }

        findings
    }
}

/// One calculation run: a single "now" shared by every row it computes
struct Calculation<'p> {
    project: &'p Project,
    now: DateTime<Utc>,
    max_depth: usize,
}

impl<'p> Calculation<'p> {
    fn new(project: &'p Project, options: &ComputeOptions) -> Self {
        Self {
            project,
            now: options.now.unwrap_or_else(Utc::now),
            max_depth: options.max_recursion_depth,
        }
    }

    fn compute(&self, table: &Table, row: &Row) -> Row {
        compute_row(
            table,
            row,
            &self.project.tables,
            &self.project.sample_data,
            self.now,
            0,
            self.max_depth,
        )
    }
}

