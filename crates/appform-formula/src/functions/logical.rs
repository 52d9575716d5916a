//! Logical functions

use super::arg;
use crate::ast::FormulaExpr;
use crate::evaluator::{evaluate, EvaluationContext};
use crate::value::FormulaValue;

/// IF function; only the chosen branch is evaluated
pub fn fn_if(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    if arg(args, 0, ctx).truthy() {
        arg(args, 1, ctx)
    } else {
        arg(args, 2, ctx)
    }
}

/// AND function (stops at the first falsy argument)
pub fn fn_and(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    FormulaValue::Boolean(args.iter().all(|a| evaluate(a, ctx).truthy()))
}

/// OR function (stops at the first truthy argument)
pub fn fn_or(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    FormulaValue::Boolean(args.iter().any(|a| evaluate(a, ctx).truthy()))
}

pub fn fn_not(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    FormulaValue::Boolean(!arg(args, 0, ctx).truthy())
}

pub fn fn_isblank(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    FormulaValue::Boolean(arg(args, 0, ctx).is_blank())
}
