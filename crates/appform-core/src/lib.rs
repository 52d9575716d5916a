//! # appform-core
//!
//! Core data model for the appform formula engine.
//!
//! This crate provides the types every other appform crate works on:
//! - [`Value`] - Dynamically typed row values (string, number, boolean, null, list)
//! - [`Column`] and [`ColumnType`] - Column definitions, including Ref targets and AppFormulas
//! - [`Table`] - An ordered list of columns with name resolution helpers
//! - [`Row`] and [`SampleData`] - Sample rows keyed by column id / table id
//! - [`Project`] - Tables plus their sample data
//!
//! ## Example
//!
//! ```rust
//! use appform_core::{row, Column, ColumnType, Project, Table};
//!
//! let products = Table::new("products", "Products")
//!     .with_column(Column::new("pid", "Product ID", ColumnType::Text).with_key())
//!     .with_column(Column::new("name", "Name", ColumnType::Name).with_label());
//!
//! let project = Project::new()
//!     .with_table(products)
//!     .with_row("products", row([("pid", "P001"), ("name", "Apple")]));
//!
//! assert!(project.validate().is_ok());
//! assert_eq!(project.table_by_name("products").unwrap().key_column_id(), Some("pid"));
//! ```

pub mod column;
pub mod error;
pub mod label;
pub mod project;
pub mod related;
pub mod row;
pub mod table;
pub mod value;

// Re-exports for convenience
pub use column::{AppSheetSettings, Column, ColumnConstraints, ColumnType};
pub use error::{Error, Result};
pub use label::{ref_display_label, row_label};
pub use project::Project;
pub use related::{related_rows, RelatedSection};
pub use row::{find_row_by_key, row, rows_for, Row, SampleData};
pub use table::{find_table_by_name, table_by_id, Table};
pub use value::{format_number, Value};
