//! Project: table definitions plus their sample rows

use crate::error::{Error, Result};
use crate::row::{rows_for, Row, SampleData};
use crate::table::{find_table_by_name, table_by_id, Table};

/// A set of tables and the sample rows stored for them
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Project {
    pub tables: Vec<Table>,
    pub sample_data: SampleData,
}

impl Project {
    /// Create an empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style table append (no duplicate check)
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Builder-style row append
    pub fn with_row<S: Into<String>>(mut self, table_id: S, row: Row) -> Self {
        self.push_row(table_id, row);
        self
    }

    /// Add a table, rejecting duplicate ids
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.table(&table.id).is_some() {
            return Err(Error::DuplicateTableId(table.id));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Append a sample row to a table
    pub fn push_row<S: Into<String>>(&mut self, table_id: S, row: Row) {
        self.sample_data.entry(table_id.into()).or_default().push(row);
    }

    /// Look up a table by id
    pub fn table(&self, id: &str) -> Option<&Table> {
        table_by_id(&self.tables, id)
    }

    /// Look up a table by display name (exact, then case-insensitive)
    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        find_table_by_name(&self.tables, name)
    }

    /// Resolve a table by id first, then by name
    pub fn resolve_table(&self, id_or_name: &str) -> Result<&Table> {
        self.table(id_or_name)
            .or_else(|| self.table_by_name(id_or_name))
            .ok_or_else(|| Error::TableNotFound(id_or_name.to_string()))
    }

    /// Sample rows of a table
    pub fn rows(&self, table_id: &str) -> &[Row] {
        rows_for(&self.sample_data, table_id)
    }

    /// A single sample row
    pub fn row(&self, table_id: &str, index: usize) -> Result<&Row> {
        let rows = self.rows(table_id);
        rows.get(index).ok_or_else(|| Error::RowOutOfBounds {
            table: table_id.to_string(),
            index,
            count: rows.len(),
        })
    }

    /// Check structural consistency.
    ///
    /// Table ids must be unique, column ids unique per table, and every Ref
    /// column must point at an existing table (and column, when one is named).
    pub fn validate(&self) -> Result<()> {
        for (i, table) in self.tables.iter().enumerate() {
            if self.tables[..i].iter().any(|t| t.id == table.id) {
                return Err(Error::DuplicateTableId(table.id.clone()));
            }

            for (j, column) in table.columns.iter().enumerate() {
                if table.columns[..j].iter().any(|c| c.id == column.id) {
                    return Err(Error::DuplicateColumnId {
                        table: table.id.clone(),
                        column: column.id.clone(),
                    });
                }

                if !column.is_ref() {
                    continue;
                }

                let target_id = column.ref_table_id().ok_or_else(|| Error::MissingRefTarget {
                    table: table.id.clone(),
                    column: column.id.clone(),
                })?;
                let target = self.table(target_id).ok_or_else(|| Error::UnknownRefTable {
                    table: table.id.clone(),
                    column: column.id.clone(),
                    target: target_id.to_string(),
                })?;

                if let Some(ref_col) = column.constraints.ref_column_id.as_deref() {
                    if target.column(ref_col).is_none() {
                        return Err(Error::UnknownRefColumn {
                            table: table.id.clone(),
                            column: column.id.clone(),
                            target: ref_col.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
