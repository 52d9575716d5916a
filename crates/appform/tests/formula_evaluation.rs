//! Tests for evaluating expressions against project rows

use appform::prelude::*;
use appform::{evaluate_expression, parse_formula, FormulaExpr};
use pretty_assertions::assert_eq;

fn shop() -> Project {
    Project::from_json_str(include_str!("fixtures/shop.json")).unwrap()
}

/// Evaluate against the first order
fn eval(formula: &str) -> Value {
    shop().evaluate("Orders", 0, formula).unwrap()
}

#[test]
fn test_evaluate_simple_formulas() {
    assert_eq!(eval("=1+2*3"), Value::from(7.0));
    assert_eq!(eval("\"Hello \" & \"World\""), Value::from("Hello World"));
    assert_eq!(eval("5 > 3"), Value::from(true));
    assert_eq!(eval("10 / 0"), Value::from(""));
    assert_eq!(eval("\"Total: \" & (1/0)"), Value::from("Total: "));
}

#[test]
fn test_evaluate_sees_computed_columns() {
    assert_eq!(eval("[Subtotal] + 1"), Value::from(301.0));
    assert_eq!(eval("[Customer].[Discount]"), Value::from(0.1));
    assert_eq!(
        eval("[Product].[Name] & \" (\" & [Product].[Category] & \")\""),
        Value::from("Apple (Fruit)")
    );
}

#[test]
fn test_evaluate_cross_table_functions() {
    assert_eq!(
        eval("FILTER(\"Products\", [Category] = \"Fruit\")"),
        Value::list(["P001", "P002"])
    );
    assert_eq!(
        eval("SELECT(Products[Name], [Price] <= [_THISROW].[Subtotal] / 3)"),
        Value::list(["Apple", "Banana", "Carrot"])
    );
    assert_eq!(
        eval("SELECT(Products[Name], [Price] < 90)"),
        Value::list(["Banana", "Carrot"])
    );
    assert_eq!(
        eval("SELECT(Customers[Name], [Discount] > 0)"),
        Value::list(["Alice"])
    );
    assert_eq!(
        eval("ANY(SELECT(Products[Price], [Product ID] = [_THISROW].[Product]))"),
        Value::from(100.0)
    );
    assert_eq!(
        eval("LOOKUP([Customer], \"Customers\", \"Customer ID\", \"Tier\")"),
        Value::from("Gold")
    );
}

#[test]
fn test_unsupported_functions_fail_soft() {
    assert_eq!(eval("COUNT(FILTER(\"Products\", TRUE))"), Value::from(""));
    assert_eq!(eval("SUM(1, 2)"), Value::from(""));
    assert_eq!(
        eval("\"a\" & SWITCH([Quantity], 3, \"three\", \"other\")"),
        Value::from("a")
    );
}

#[test]
fn test_full_width_input() {
    assert_eq!(eval("10＋20"), Value::from(30.0));
    assert_eq!(eval("5×3"), Value::from(15.0));
    assert_eq!(eval("10／2"), Value::from(5.0));
    assert_eq!(eval("１０＋２０"), Value::from(0.0));
}

#[test]
fn test_evaluate_with_context_directly() {
    let project = shop();
    let table = project.resolve_table("Products").unwrap();
    let row = &project.rows(&table.id)[1];
    let ctx = EvaluationContext::new(&project.tables, &project.sample_data, table, row);

    assert_eq!(evaluate_expression("[Name]", &ctx), Value::from("Banana"));
    assert_eq!(evaluate_expression("[Price] * 2", &ctx), Value::from(160.0));
    assert_eq!(evaluate_expression("[Nope]", &ctx), Value::from(""));
}

#[test]
fn test_parse_formula_shapes() {
    assert_eq!(
        parse_formula("[Customer].[Name]"),
        FormulaExpr::column(["Customer", "Name"])
    );
    assert!(matches!(
        parse_formula("SELECT(Items[Name], TRUE)"),
        FormulaExpr::Function { ref name, ref args } if name == "SELECT" && args.len() == 2
    ));
}
