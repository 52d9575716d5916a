//! Error types for appform-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in appform-core
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Two tables share the same id
    #[error("Duplicate table id: {0}")]
    DuplicateTableId(String),

    /// Two columns of one table share the same id
    #[error("Duplicate column id '{column}' in table '{table}'")]
    DuplicateColumnId { table: String, column: String },

    /// Table not found by id or name
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A Ref column points at a table that does not exist
    #[error("Column '{column}' in table '{table}' references unknown table '{target}'")]
    UnknownRefTable {
        table: String,
        column: String,
        target: String,
    },

    /// A Ref column names a key column that does not exist on the target table
    #[error("Column '{column}' in table '{table}' references unknown column '{target}'")]
    UnknownRefColumn {
        table: String,
        column: String,
        target: String,
    },

    /// A Ref column without a target table
    #[error("Ref column '{column}' in table '{table}' has no target table")]
    MissingRefTarget { table: String, column: String },

    /// Row index out of bounds
    #[error("Row index {index} out of bounds for table '{table}' (count: {count})")]
    RowOutOfBounds {
        table: String,
        index: usize,
        count: usize,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
