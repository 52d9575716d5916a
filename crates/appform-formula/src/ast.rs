//! Formula Abstract Syntax Tree types

use std::fmt;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
    /// Boolean literal (`TRUE` / `FALSE`)
    Boolean(bool),
    /// `BLANK`, and the stand-in for anything that failed to parse
    Blank,

    // === References ===
    /// Column path: `[Customer].[Name]` is `["Customer", "Name"]`
    ColumnRef(Vec<String>),
    /// `Table[Column]`, only meaningful as the first argument of SELECT
    TableColumnRef(TableColumnRef),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    // === Function call ===
    Function {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

impl FormulaExpr {
    /// Create a column reference from path segments
    pub fn column<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FormulaExpr::ColumnRef(path.into_iter().map(Into::into).collect())
    }

    /// Visit this node and all of its descendants, parents first
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a FormulaExpr)) {
        visit(self);
        match self {
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.walk(visit),
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            _ => {}
        }
    }
}

/// `Table[Column]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumnRef {
    pub table: String,
    pub column: String,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Text
    Concat,
}

impl BinaryOperator {
    /// Operator symbol as written in formulas
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Concat => "&",
        }
    }

    /// Check if this is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqual
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Negate,
}
