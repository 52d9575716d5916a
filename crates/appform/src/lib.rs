//! # appform
//!
//! An AppSheet-compatible formula engine for no-code app editors.
//!
//! appform evaluates AppFormula expressions (`[Price] * [Quantity]`,
//! `LOOKUP([Product], "Products", "Product ID", "Name")`,
//! `SELECT(Items[Name], [Active] = TRUE)`) against sample table data, so an
//! editor can preview virtual columns without a backend.
//!
//! ## Features
//!
//! - Fail-soft evaluation: bad formulas produce blanks, never errors
//! - `[Ref].[Column]` dereferences with recursion guards
//! - LOOKUP, FILTER, SELECT and ANY across tables
//! - Whole-row and whole-table computation of AppFormula columns
//! - Static checks for unknown columns, tables and functions
//! - Projects load from and save to the editor's JSON format
//!
//! ## Example
//!
//! ```rust
//! use appform::prelude::*;
//!
//! let project = Project::new()
//!     .with_table(
//!         Table::new("orders", "Orders")
//!             .with_column(Column::new("id", "Order ID", ColumnType::Text).with_key())
//!             .with_column(Column::new("qty", "Quantity", ColumnType::Number))
//!             .with_column(Column::new("price", "Price", ColumnType::Price))
//!             .with_column(
//!                 Column::new("total", "Total", ColumnType::Price)
//!                     .with_virtual()
//!                     .with_formula("[Quantity] * [Price]"),
//!             ),
//!     )
//!     .with_row(
//!         "orders",
//!         row([("id", Value::from("O1")), ("qty", Value::from(3.0)), ("price", Value::from(100.0))]),
//!     );
//!
//! let rows = project.compute_table("Orders").unwrap();
//! assert_eq!(rows[0]["total"], Value::from(300.0));
//!
//! let label = project.evaluate("orders", 0, "\"Order \" & [Order ID]").unwrap();
//! assert_eq!(label, Value::from("Order O1"));
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{FormulaDiagnostic, ProjectCalculationExt};

// Re-export core types
pub use appform_core::{
    find_row_by_key,
    find_table_by_name,
    ref_display_label,
    related_rows,
    row,
    row_label,
    rows_for,
    table_by_id,
    // Column definitions
    AppSheetSettings,
    Column,
    ColumnConstraints,
    ColumnType,
    // Error types
    Error,
    // Main types
    Project,
    RelatedSection,
    Result,
    Row,
    SampleData,
    Table,
    Value,
};

// Re-export formula types
pub use appform_formula::{
    check_formula, clear_parse_cache, compute_row, compute_row_with_formulas,
    compute_row_with_options, evaluate, evaluate_expression, parse_cache_len,
    parse_expression_cached, parse_formula, parse_formula_strict, ComputeOptions,
    EvaluationContext, FormulaError, FormulaExpr, FormulaResult, FormulaValue,
    DEFAULT_MAX_RECURSION_DEPTH,
};

use std::fs;
use std::path::Path;

/// Extension trait for Project to add JSON file I/O
pub trait ProjectExt: Sized {
    /// Open a project from a JSON file
    ///
    /// Structural problems such as a Ref column without a target are not
    /// load errors; they evaluate to blanks. Call
    /// [`Project::validate`] to report them.
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Parse a project from JSON text
    fn from_json_str(json: &str) -> Result<Self>;

    /// Save the project as pretty-printed JSON
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Serialize the project to pretty-printed JSON
    fn to_json_string(&self) -> Result<String>;
}

impl ProjectExt for Project {
    fn open<P: AsRef<Path>>(path: P) -> Result<Project> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("json") => {
                let text = fs::read_to_string(path)
                    .map_err(|e| Error::other(format!("{}: {}", path.display(), e)))?;
                Project::from_json_str(&text)
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    fn from_json_str(json: &str) -> Result<Project> {
        let project: Project =
            serde_json::from_str(json).map_err(|e| Error::other(e.to_string()))?;
        tracing::debug!(
            tables = project.tables.len(),
            rows = project.sample_data.values().map(Vec::len).sum::<usize>(),
            "loaded project"
        );
        Ok(project)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|e| Error::other(format!("{}: {}", path.display(), e)))
    }

    fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::other(e.to_string()))
    }
}
