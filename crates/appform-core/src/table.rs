//! Table definitions and name resolution

use crate::column::Column;
use crate::error::{Error, Result};

/// A table: an ordered list of columns
///
/// Column order matters: it decides which column acts as the implicit key
/// and label when none is flagged.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Table {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    pub columns: Vec<Column>,
}

impl Table {
    /// Create an empty table
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            columns: Vec::new(),
        }
    }

    /// Builder-style column append (no duplicate check)
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a column, rejecting duplicate ids
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.column(&column.id).is_some() {
            return Err(Error::DuplicateColumnId {
                table: self.id.clone(),
                column: column.id,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Look up a column by id
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Look up a column by display name.
    ///
    /// Names are compared trimmed; an exact match wins over a
    /// case-insensitive one.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        let needle = name.trim();
        self.columns
            .iter()
            .find(|c| c.name.trim() == needle)
            .or_else(|| {
                let lower = needle.to_lowercase();
                self.columns
                    .iter()
                    .find(|c| c.name.trim().to_lowercase() == lower)
            })
    }

    /// Column id for a display name (see [`column_by_name`](Self::column_by_name))
    pub fn column_id_by_name(&self, name: &str) -> Option<&str> {
        self.column_by_name(name).map(|c| c.id.as_str())
    }

    /// The effective key column: the first flagged key, else the first column
    pub fn key_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.is_key)
            .or_else(|| self.columns.first())
    }

    /// Id of the effective key column
    pub fn key_column_id(&self) -> Option<&str> {
        self.key_column().map(|c| c.id.as_str())
    }

    /// Columns flagged as labels
    pub fn label_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_label)
    }

    /// Columns carrying a non-empty AppFormula, in column order
    pub fn formula_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.app_formula().is_some())
    }
}

/// Find a table by display name: trimmed, exact first, then case-insensitive
pub fn find_table_by_name<'a>(tables: &'a [Table], name: &str) -> Option<&'a Table> {
    let needle = name.trim();
    if needle.is_empty() {
        return None;
    }
    tables.iter().find(|t| t.name.trim() == needle).or_else(|| {
        let lower = needle.to_lowercase();
        tables
            .iter()
            .find(|t| t.name.trim().to_lowercase() == lower)
    })
}

/// Find a table by id
pub fn table_by_id<'a>(tables: &'a [Table], id: &str) -> Option<&'a Table> {
    tables.iter().find(|t| t.id == id)
}
