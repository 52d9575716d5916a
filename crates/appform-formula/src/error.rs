//! Formula error types
//!
//! Evaluation never fails: problems degrade to blank values. These errors are
//! produced only by the strict paths ([`parse_formula_strict`](crate::parse_formula_strict)
//! and [`check_formula`](crate::check_formula)) that editors use to flag
//! suspicious formulas.

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Problems found in a formula.
///
/// Positions are character offsets into the normalized formula text
/// (after full-width folding and removal of a leading `=`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// String literal without a closing quote
    #[error("Unterminated string literal starting at {0}")]
    UnterminatedString(usize),

    /// `[` without a closing `]`
    #[error("Unterminated column reference starting at {0}")]
    UnterminatedBracket(usize),

    /// Character the tokenizer skipped
    #[error("Unexpected character '{ch}' at {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },

    /// Token that cannot start an expression (replaced by blank)
    #[error("Unexpected {0}")]
    UnexpectedToken(String),

    /// `(` without a matching `)`
    #[error("Missing closing parenthesis")]
    UnclosedParen,

    /// Input left over after a complete expression
    #[error("Unexpected input after expression: {0}")]
    TrailingInput(String),

    /// Nesting deeper than the parser accepts
    #[error("Expression nested too deeply")]
    TooDeep,

    /// Function name the evaluator does not know (evaluates to blank)
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Column name not found on the table being read
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Table name not found
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// `[A].[B]` where `A` is not a Ref column with a target table
    #[error("Column '{0}' is not a Ref column and cannot be dereferenced")]
    NotARef(String),
}
