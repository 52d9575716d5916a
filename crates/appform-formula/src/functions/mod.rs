//! Built-in formula functions
//!
//! Functions receive their arguments unevaluated so that IF can pick a branch
//! and AND/OR can short-circuit. A missing argument evaluates to blank.

pub mod date;
pub mod logical;
pub mod lookup;
pub mod text;

use std::collections::HashMap;

use crate::ast::FormulaExpr;
use crate::evaluator::{evaluate, EvaluationContext};
use crate::value::FormulaValue;

/// Function implementation signature
pub type FunctionImpl = fn(&[FormulaExpr], &EvaluationContext) -> FormulaValue;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Result depends on the evaluation instant rather than only on row data
    pub volatile: bool,
}

impl FunctionDef {
    /// Whether a call with `count` arguments is well-formed
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Human-readable arity, e.g. `1`, `2-3` or `at least 1`
    pub fn arity(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}-{}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}

/// Function registry
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register_logical_functions();
        registry.register_text_functions();
        registry.register_date_functions();
        registry.register_lookup_functions();

        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Whether the function's result depends on the evaluation instant
    pub fn is_volatile(&self, name: &str) -> bool {
        self.get(name).map_or(false, |def| def.volatile)
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 3,
            max_args: Some(3),
            implementation: logical::fn_if,
            volatile: false,
        });

        // AND
        self.register(FunctionDef {
            name: "AND",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_and,
            volatile: false,
        });

        // OR
        self.register(FunctionDef {
            name: "OR",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_or,
            volatile: false,
        });

        // NOT
        self.register(FunctionDef {
            name: "NOT",
            min_args: 1,
            max_args: Some(1),
            implementation: logical::fn_not,
            volatile: false,
        });

        // ISBLANK
        self.register(FunctionDef {
            name: "ISBLANK",
            min_args: 1,
            max_args: Some(1),
            implementation: logical::fn_isblank,
            volatile: false,
        });
    }

    fn register_text_functions(&mut self) {
        // CONCATENATE
        self.register(FunctionDef {
            name: "CONCATENATE",
            min_args: 1,
            max_args: None,
            implementation: text::fn_concatenate,
            volatile: false,
        });

        // TEXT (an optional format argument is accepted and ignored)
        self.register(FunctionDef {
            name: "TEXT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_text,
            volatile: false,
        });
    }

    fn register_date_functions(&mut self) {
        // TODAY
        self.register(FunctionDef {
            name: "TODAY",
            min_args: 0,
            max_args: Some(0),
            implementation: date::fn_today,
            volatile: true,
        });

        // NOW
        self.register(FunctionDef {
            name: "NOW",
            min_args: 0,
            max_args: Some(0),
            implementation: date::fn_now,
            volatile: true,
        });
    }

    fn register_lookup_functions(&mut self) {
        // ANY
        self.register(FunctionDef {
            name: "ANY",
            min_args: 1,
            max_args: Some(1),
            implementation: lookup::fn_any,
            volatile: false,
        });

        // LOOKUP
        self.register(FunctionDef {
            name: "LOOKUP",
            min_args: 4,
            max_args: Some(4),
            implementation: lookup::fn_lookup,
            volatile: false,
        });

        // FILTER
        self.register(FunctionDef {
            name: "FILTER",
            min_args: 2,
            max_args: Some(2),
            implementation: lookup::fn_filter,
            volatile: false,
        });

        // SELECT
        self.register(FunctionDef {
            name: "SELECT",
            min_args: 2,
            max_args: Some(2),
            implementation: lookup::fn_select,
            volatile: false,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate the `index`-th argument; missing arguments are blank
pub(crate) fn arg(args: &[FormulaExpr], index: usize, ctx: &EvaluationContext) -> FormulaValue {
    args.get(index)
        .map_or_else(FormulaValue::blank, |expr| evaluate(expr, ctx))
}

/// Evaluate the `index`-th argument as trimmed text
pub(crate) fn text_arg(args: &[FormulaExpr], index: usize, ctx: &EvaluationContext) -> String {
    arg(args, index, ctx).as_string().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert!(registry.get("if").is_some());
        assert!(registry.get("Concatenate").is_some());
        assert!(registry.get("COUNT").is_none());
        assert!(registry.get("SWITCH").is_none());
    }

    #[test]
    fn test_arity() {
        let registry = FunctionRegistry::new();
        let lookup = registry.get("LOOKUP").unwrap();
        assert!(lookup.accepts(4));
        assert!(!lookup.accepts(3));
        assert_eq!(lookup.arity(), "4");

        let and = registry.get("AND").unwrap();
        assert!(and.accepts(12));
        assert!(!and.accepts(0));
        assert_eq!(and.arity(), "at least 1");

        assert_eq!(registry.get("TEXT").unwrap().arity(), "1-2");
    }

    #[test]
    fn test_volatile() {
        let registry = FunctionRegistry::new();
        assert!(registry.is_volatile("now"));
        assert!(registry.is_volatile("TODAY"));
        assert!(!registry.is_volatile("IF"));
        assert!(!registry.is_volatile("UNKNOWN"));
    }

    #[test]
    fn test_names() {
        let registry = FunctionRegistry::new();
        assert_eq!(
            registry.names(),
            vec![
                "AND",
                "ANY",
                "CONCATENATE",
                "FILTER",
                "IF",
                "ISBLANK",
                "LOOKUP",
                "NOT",
                "NOW",
                "OR",
                "SELECT",
                "TEXT",
                "TODAY"
            ]
        );
    }
}
