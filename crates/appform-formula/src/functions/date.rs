//! Date functions
//!
//! Both read the context's evaluation instant, never the wall clock, so a
//! whole row computation sees one consistent "now".

use chrono::SecondsFormat;

use crate::ast::FormulaExpr;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;

/// TODAY function: `YYYY-MM-DD` (UTC)
pub fn fn_today(_args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    FormulaValue::String(ctx.now.format("%Y-%m-%d").to_string())
}

/// NOW function: ISO-8601 instant with milliseconds, e.g. `2025-01-02T03:04:05.006Z`
pub fn fn_now(_args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    FormulaValue::String(ctx.now.to_rfc3339_opts(SecondsFormat::Millis, true))
}
