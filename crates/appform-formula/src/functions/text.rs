//! Text functions

use super::arg;
use crate::ast::FormulaExpr;
use crate::evaluator::{evaluate, EvaluationContext};
use crate::value::FormulaValue;

/// CONCATENATE function: display strings joined with no separator
pub fn fn_concatenate(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    let joined: String = args.iter().map(|a| evaluate(a, ctx).as_string()).collect();
    FormulaValue::String(joined)
}

/// TEXT function: display string of the first argument
pub fn fn_text(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    FormulaValue::String(arg(args, 0, ctx).as_string())
}
