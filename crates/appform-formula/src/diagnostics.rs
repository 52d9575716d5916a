//! Static formula checks
//!
//! Evaluation silently turns mistakes into blanks. These checks surface the
//! usual causes (typos in column and table names, unsupported functions,
//! wrong argument counts) without evaluating anything.

use appform_core::{find_table_by_name, table_by_id, Column, Table};

use crate::ast::FormulaExpr;
use crate::error::FormulaError;
use crate::evaluator::get_function_registry;
use crate::parser::parse_with_issues;

/// Check a formula written for a column of `table`.
///
/// Reports lexical and syntax issues first, then unresolved names in
/// evaluation order. An empty result means the formula only uses names that
/// exist; it says nothing about the values it will produce.
///
/// # Example
/// ```rust
/// use appform_core::{Column, ColumnType, Table};
/// use appform_formula::{check_formula, FormulaError};
///
/// let table = Table::new("t", "Orders").with_column(Column::new("qty", "Quantity", ColumnType::Number));
/// let tables = vec![table];
///
/// assert!(check_formula("[Quantity] * 2", &tables[0], &tables).is_empty());
/// assert_eq!(
///     check_formula("[Qty] * 2", &tables[0], &tables),
///     vec![FormulaError::UnknownColumn("Qty".into())]
/// );
/// ```
pub fn check_formula(text: &str, table: &Table, tables: &[Table]) -> Vec<FormulaError> {
    let (expr, issues) = parse_with_issues(text);
    let mut checker = Checker { tables, issues };
    checker.check(
        &expr,
        Scope {
            table,
            this_table: None,
        },
    );
    checker.issues
}

/// Whether the expression calls NOW(), TODAY() or another volatile function
pub fn references_volatile(expr: &FormulaExpr) -> bool {
    let registry = get_function_registry();
    let mut volatile = false;
    expr.walk(&mut |node| {
        if let FormulaExpr::Function { name, .. } = node {
            volatile |= registry.is_volatile(name);
        }
    });
    volatile
}

/// Tables that bare `[Column]` and `[_THISROW].[Column]` resolve against
#[derive(Clone, Copy)]
struct Scope<'a> {
    table: &'a Table,
    this_table: Option<&'a Table>,
}

struct Checker<'a> {
    tables: &'a [Table],
    issues: Vec<FormulaError>,
}

impl<'a> Checker<'a> {
    fn check(&mut self, expr: &FormulaExpr, scope: Scope<'a>) {
        match expr {
            FormulaExpr::Number(_)
            | FormulaExpr::String(_)
            | FormulaExpr::Boolean(_)
            | FormulaExpr::Blank => {}
            FormulaExpr::ColumnRef(path) => self.check_path(path, scope),
            FormulaExpr::TableColumnRef(r) => {
                if let Some(table) = self.table_named(&r.table) {
                    self.column_named(table, &r.column);
                }
            }
            FormulaExpr::UnaryOp { operand, .. } => self.check(operand, scope),
            FormulaExpr::BinaryOp { left, right, .. } => {
                self.check(left, scope);
                self.check(right, scope);
            }
            FormulaExpr::Function { name, args } => self.check_function(name, args, scope),
        }
    }

    fn check_path(&mut self, path: &[String], scope: Scope<'a>) {
        let (mut table, path) = match path.split_first() {
            Some((first, rest)) if first.eq_ignore_ascii_case("_THISROW") => {
                match scope.this_table {
                    Some(outer) if !rest.is_empty() => (outer, rest),
                    _ => {
                        self.issues.push(FormulaError::UnknownColumn(first.clone()));
                        return;
                    }
                }
            }
            _ => (scope.table, path),
        };

        for (i, name) in path.iter().enumerate() {
            let Some(column) = self.column_named(table, name) else {
                return;
            };
            if i + 1 == path.len() {
                return;
            }
            match column.ref_table_id().and_then(|id| table_by_id(self.tables, id)) {
                Some(target) => table = target,
                None => {
                    self.issues.push(FormulaError::NotARef(name.clone()));
                    return;
                }
            }
        }
    }

    fn check_function(&mut self, name: &str, args: &[FormulaExpr], scope: Scope<'a>) {
        let Some(def) = get_function_registry().get(name) else {
            self.issues.push(FormulaError::UnknownFunction(name.to_string()));
            for arg in args {
                self.check(arg, scope);
            }
            return;
        };

        if !def.accepts(args.len()) {
            self.issues.push(FormulaError::ArgumentCount {
                function: def.name.to_string(),
                expected: def.arity(),
                actual: args.len(),
            });
        }

        match def.name {
            "LOOKUP" => {
                if let Some(key) = args.first() {
                    self.check(key, scope);
                }
                let target = args.get(1).and_then(|arg| self.table_arg(arg, scope));
                for arg in args.iter().skip(2) {
                    match (literal(arg), target) {
                        (Some(column), Some(table)) => {
                            self.column_named(table, column);
                        }
                        (Some(_), None) => {}
                        (None, _) => self.check(arg, scope),
                    }
                }
            }
            "FILTER" => {
                let target = args.first().and_then(|arg| self.table_arg(arg, scope));
                self.check_predicate(args.get(1..).unwrap_or_default(), target, scope);
            }
            "SELECT" => {
                let target = match args.first() {
                    Some(FormulaExpr::TableColumnRef(r)) => {
                        let table = self.table_named(&r.table);
                        if let Some(table) = table {
                            self.column_named(table, &r.column);
                        }
                        table
                    }
                    Some(arg) => {
                        self.check(arg, scope);
                        None
                    }
                    None => None,
                };
                self.check_predicate(args.get(1..).unwrap_or_default(), target, scope);
            }
            _ => {
                for arg in args {
                    self.check(arg, scope);
                }
            }
        }
    }

    /// Table named by a string literal argument; other shapes are checked
    /// as ordinary expressions
    fn table_arg(&mut self, arg: &FormulaExpr, scope: Scope<'a>) -> Option<&'a Table> {
        match literal(arg) {
            Some(name) => self.table_named(name),
            None => {
                self.check(arg, scope);
                None
            }
        }
    }

    /// Check FILTER/SELECT predicates against the rows they will run on
    fn check_predicate(
        &mut self,
        rest: &[FormulaExpr],
        target: Option<&'a Table>,
        scope: Scope<'a>,
    ) {
        let Some(target) = target else {
            return;
        };
        let inner = Scope {
            table: target,
            this_table: Some(scope.table),
        };
        for arg in rest {
            self.check(arg, inner);
        }
    }

    fn table_named(&mut self, name: &str) -> Option<&'a Table> {
        let found = find_table_by_name(self.tables, name);
        if found.is_none() {
            self.issues.push(FormulaError::UnknownTable(name.trim().to_string()));
        }
        found
    }

    fn column_named(&mut self, table: &'a Table, name: &str) -> Option<&'a Column> {
        let found = table.column_by_name(name);
        if found.is_none() {
            self.issues.push(FormulaError::UnknownColumn(name.trim().to_string()));
        }
        found
    }
}

/// String literal argument, e.g. the table name in `FILTER("Items", ...)`
fn literal(expr: &FormulaExpr) -> Option<&str> {
    match expr {
        FormulaExpr::String(s) => Some(s.as_str()),
        _ => None,
    }
}
