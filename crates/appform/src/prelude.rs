//! Prelude module - common imports for appform users
//!
//! ```rust
//! use appform::prelude::*;
//! ```

pub use crate::{
    row,
    // Column definitions
    Column,
    ColumnType,
    // Calculation types
    ComputeOptions,
    // Error types
    Error,
    EvaluationContext,
    FormulaError,
    // Main types
    Project,
    // Extension traits
    ProjectCalculationExt,
    ProjectExt,
    Result,
    Row,
    SampleData,
    Table,
    Value,
};
