//! Lookup and list functions
//!
//! LOOKUP, FILTER and SELECT read rows of another table. Each candidate row
//! has its own formulas computed first (one recursion level deeper), so
//! virtual columns can be matched and returned like stored ones.

use appform_core::{find_table_by_name, rows_for, Row, Table, Value};

use super::{arg, text_arg};
use crate::ast::FormulaExpr;
use crate::coerce;
use crate::evaluator::{evaluate, EvaluationContext};
use crate::value::FormulaValue;

/// ANY function: first element of a list, or the value itself
pub fn fn_any(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    match arg(args, 0, ctx) {
        FormulaValue::List(items) => items
            .into_iter()
            .next()
            .map_or_else(FormulaValue::blank, FormulaValue::from),
        other => other,
    }
}

/// LOOKUP(key, "Table", "KeyColumn", "ReturnColumn")
pub fn fn_lookup(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    let key = text_arg(args, 0, ctx);
    let table_name = text_arg(args, 1, ctx);
    let key_column = text_arg(args, 2, ctx);
    let return_column = text_arg(args, 3, ctx);
    if key.is_empty() || table_name.is_empty() || key_column.is_empty() || return_column.is_empty()
    {
        return FormulaValue::blank();
    }

    let Some(table) = find_table_by_name(ctx.tables, &table_name) else {
        return FormulaValue::blank();
    };
    let (Some(key_id), Some(return_id)) = (
        table.column_id_by_name(&key_column),
        table.column_id_by_name(&return_column),
    ) else {
        return FormulaValue::blank();
    };

    let found = rows_for(ctx.sample_data, &table.id).iter().find(|r| {
        let cell = r.get(key_id).unwrap_or(&Value::Null);
        coerce::as_string(cell).trim() == key
    });

    match found {
        Some(found) => match ctx.compute_nested(table, found).remove(return_id) {
            Some(Value::Null) | None => FormulaValue::blank(),
            Some(value) => value.into(),
        },
        None => FormulaValue::blank(),
    }
}

/// FILTER("Table", predicate): keys of the rows matching the predicate
pub fn fn_filter(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    let table_name = text_arg(args, 0, ctx);
    let Some(table) = find_table_by_name(ctx.tables, &table_name) else {
        return FormulaValue::List(Vec::new());
    };
    let Some(key_id) = table.key_column_id() else {
        return FormulaValue::List(Vec::new());
    };

    let keys = matching_rows(table, args.get(1), ctx)
        .filter_map(|computed| {
            let key = computed
                .get(key_id)
                .map(coerce::as_string)
                .unwrap_or_default();
            let key = key.trim();
            (!key.is_empty()).then(|| Value::String(key.to_string()))
        })
        .collect();

    FormulaValue::List(keys)
}

/// SELECT(Table[Column], predicate): non-blank column values of the rows
/// matching the predicate
pub fn fn_select(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaValue {
    let target = match arg(args, 0, ctx) {
        FormulaValue::TableColumn(target) => target,
        _ => return FormulaValue::List(Vec::new()),
    };

    let Some(table) = find_table_by_name(ctx.tables, &target.table) else {
        return FormulaValue::List(Vec::new());
    };
    let Some(column_id) = table.column_id_by_name(&target.column) else {
        return FormulaValue::List(Vec::new());
    };

    let values = matching_rows(table, args.get(1), ctx)
        .filter_map(|mut computed| computed.remove(column_id))
        .filter(|v| !coerce::is_blank(v))
        .collect();

    FormulaValue::List(values)
}

/// Computed rows of `table` for which `predicate` holds (all rows when absent).
///
/// The predicate sees the candidate row as its own and the calling row as
/// `[_THISROW]`.
fn matching_rows<'c>(
    table: &'c Table,
    predicate: Option<&'c FormulaExpr>,
    ctx: &'c EvaluationContext<'c>,
) -> impl Iterator<Item = Row> + 'c {
    rows_for(ctx.sample_data, &table.id)
        .iter()
        .map(move |raw| ctx.compute_nested(table, raw))
        .filter(move |computed| match predicate {
            Some(predicate) => evaluate(predicate, &ctx.scoped(table, computed)).truthy(),
            None => true,
        })
}

#[cfg(test)]
mod tests {
    use crate::evaluator::{evaluate_expression, EvaluationContext};
    use appform_core::{row, Column, ColumnType, Row, SampleData, Table, Value};
    use pretty_assertions::assert_eq;

    fn fixture() -> (Vec<Table>, SampleData) {
        let products = Table::new("products", "Products")
            .with_column(Column::new("pid", "Product ID", ColumnType::Text).with_key())
            .with_column(Column::new("name", "Name", ColumnType::Name))
            .with_column(Column::new("price", "Price", ColumnType::Price))
            .with_column(
                Column::new("taxed", "Taxed", ColumnType::Price)
                    .with_virtual()
                    .with_formula("[Price] * 1.1"),
            );
        let items = Table::new("items", "Items")
            .with_column(Column::new("iid", "Item ID", ColumnType::Text).with_key())
            .with_column(Column::new("name", "Name", ColumnType::Name))
            .with_column(Column::new("cat", "Category", ColumnType::Enum))
            .with_column(Column::new("active", "Active", ColumnType::YesNo));
        let orders = Table::new("orders", "Orders")
            .with_column(Column::new("oid", "Order ID", ColumnType::Text).with_key())
            .with_column(Column::new("want", "Wanted", ColumnType::Enum));

        let mut data = SampleData::default();
        data.insert(
            "products".into(),
            vec![
                row([
                    ("pid", Value::from("P001")),
                    ("name", Value::from("Apple")),
                    ("price", Value::from(100.0)),
                ]),
                row([
                    ("pid", Value::from("P002")),
                    ("name", Value::from("Banana")),
                    ("price", Value::from(80.0)),
                ]),
            ],
        );
        data.insert(
            "items".into(),
            vec![
                row([
                    ("iid", Value::from("I001")),
                    ("name", Value::from("Item A")),
                    ("cat", Value::from("Fruit")),
                    ("active", Value::from(true)),
                ]),
                row([
                    ("iid", Value::from("I002")),
                    ("name", Value::from("Item B")),
                    ("cat", Value::from("Vegetable")),
                    ("active", Value::from(false)),
                ]),
                row([
                    ("iid", Value::from("I003")),
                    ("name", Value::from("Item C")),
                    ("cat", Value::from("Fruit")),
                    ("active", Value::from(true)),
                ]),
                row([
                    ("iid", Value::from("  ")),
                    ("name", Value::from("")),
                    ("cat", Value::from("Fruit")),
                    ("active", Value::from(true)),
                ]),
            ],
        );
        (vec![products, items, orders], data)
    }

    fn eval_in(table_index: usize, r: &Row, formula: &str) -> Value {
        let (tables, data) = fixture();
        let ctx = EvaluationContext::new(&tables, &data, &tables[table_index], r);
        evaluate_expression(formula, &ctx)
    }

    fn eval(formula: &str) -> Value {
        eval_in(2, &row([("oid", "O1"), ("want", "Fruit")]), formula)
    }

    #[test]
    fn test_lookup() {
        assert_eq!(
            eval("LOOKUP(\"P001\", \"Products\", \"Product ID\", \"Name\")"),
            Value::from("Apple")
        );
        assert_eq!(
            eval("LOOKUP(\"P002\", \"Products\", \"Product ID\", \"Price\")"),
            Value::from(80.0)
        );
        assert_eq!(
            eval("LOOKUP(\" P001 \", \"products\", \"product id\", \"name\")"),
            Value::from("Apple")
        );
    }

    #[test]
    fn test_lookup_computes_target_row() {
        assert_eq!(
            eval("LOOKUP(\"P001\", \"Products\", \"Product ID\", \"Taxed\")"),
            Value::from(100.0 * 1.1)
        );
    }

    #[test]
    fn test_lookup_misses_are_blank() {
        assert_eq!(
            eval("LOOKUP(\"P999\", \"Products\", \"Product ID\", \"Name\")"),
            Value::from("")
        );
        assert_eq!(
            eval("LOOKUP(\"P001\", \"Nope\", \"Product ID\", \"Name\")"),
            Value::from("")
        );
        assert_eq!(
            eval("LOOKUP(\"P001\", \"Products\", \"Product ID\", \"Nope\")"),
            Value::from("")
        );
        assert_eq!(
            eval("LOOKUP(\"\", \"Products\", \"Product ID\", \"Name\")"),
            Value::from("")
        );
        assert_eq!(eval("LOOKUP(\"P001\", \"Products\")"), Value::from(""));
    }

    #[test]
    fn test_filter() {
        assert_eq!(
            eval("FILTER(\"Items\", [Category] = \"Fruit\")"),
            Value::list(["I001", "I003"])
        );
        assert_eq!(
            eval("FILTER(\"Items\", [Category] = [_THISROW].[Wanted])"),
            Value::list(["I001", "I003"])
        );
        assert_eq!(eval("FILTER(\"Items\", FALSE)"), Value::List(vec![]));
        assert_eq!(eval("FILTER(\"Nope\", TRUE)"), Value::List(vec![]));
    }

    #[test]
    fn test_filter_without_predicate_keeps_all_keyed_rows() {
        assert_eq!(
            eval("FILTER(\"Items\")"),
            Value::list(["I001", "I002", "I003"])
        );
    }

    #[test]
    fn test_select() {
        assert_eq!(
            eval("SELECT(Items[Name], [Active] = TRUE)"),
            Value::list(["Item A", "Item C"])
        );
        assert_eq!(
            eval("SELECT(Items[Category], [Item ID] = \"I002\")"),
            Value::list(["Vegetable"])
        );
        assert_eq!(
            eval("SELECT(Products[Taxed], [Price] > 90)"),
            Value::list(vec![Value::from(100.0 * 1.1)])
        );
    }

    #[test]
    fn test_select_requires_table_column() {
        assert_eq!(eval("SELECT(\"Items\", TRUE)"), Value::List(vec![]));
        assert_eq!(eval("SELECT([Wanted], TRUE)"), Value::List(vec![]));
        assert_eq!(eval("SELECT(Items[Nope], TRUE)"), Value::List(vec![]));
        assert_eq!(eval("SELECT(Nope[Name], TRUE)"), Value::List(vec![]));
    }

    #[test]
    fn test_any() {
        assert_eq!(eval("ANY(\"single\")"), Value::from("single"));
        assert_eq!(
            eval("ANY(FILTER(\"Items\", [Category] = \"Fruit\"))"),
            Value::from("I001")
        );
        assert_eq!(eval("ANY(FILTER(\"Items\", FALSE))"), Value::from(""));
        assert_eq!(
            eval("LOOKUP(ANY(SELECT(Items[Item ID], [Name] = \"Item C\")), \"Items\", \"Item ID\", \"Category\")"),
            Value::from("Fruit")
        );
    }

    #[test]
    fn test_list_renders_in_concat() {
        assert_eq!(
            eval("\"Fruit: \" & FILTER(\"Items\", [Category] = \"Fruit\")"),
            Value::from("Fruit: I001, I003")
        );
    }
}
