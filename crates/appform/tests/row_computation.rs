//! Tests for computing AppFormula columns across a project

use appform::prelude::*;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn shop() -> Project {
    Project::from_json_str(include_str!("fixtures/shop.json")).unwrap()
}

#[test]
fn test_compute_table_follows_refs_and_lookups() {
    let project = shop();
    let rows = project.compute_table("Orders").unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["c_subtotal"], Value::from(300.0));
    assert_eq!(rows[0]["c_total"], Value::from(300.0 * (1.0 - 0.1)));
    assert_eq!(rows[0]["c_summary"], Value::from("Alice: 3 x Apple"));

    assert_eq!(rows[1]["c_subtotal"], Value::from(100.0));
    assert_eq!(rows[1]["c_total"], Value::from(100.0));
    assert_eq!(rows[1]["c_summary"], Value::from("Bob: 2 x Carrot"));
}

#[test]
fn test_broken_rows_degrade_to_blank() {
    let project = shop();
    let rows = project.compute_table("tbl_orders").unwrap();

    // Unknown customer and a non-numeric quantity
    assert_eq!(rows[2]["c_subtotal"], Value::from(""));
    assert_eq!(rows[2]["c_total"], Value::from(""));
    assert_eq!(rows[2]["c_summary"], Value::from(": n/a x Banana"));
    assert_eq!(rows[2]["c_qty"], Value::from("n/a"));
}

#[test]
fn test_tables_without_formulas_come_back_as_stored() {
    let project = shop();
    let rows = project.compute_table("Products").unwrap();
    assert_eq!(rows, project.rows("tbl_products").to_vec());
}

#[test]
fn test_compute_row_and_unknown_table() {
    let project = shop();
    let row = project
        .compute_row("Customers", 0, &ComputeOptions::default())
        .unwrap();
    assert_eq!(row["c_discount"], Value::from(0.1));

    assert_eq!(
        project.compute_table("Invoices"),
        Err(Error::TableNotFound("Invoices".into()))
    );
    assert!(matches!(
        project.compute_row("Customers", 9, &ComputeOptions::default()),
        Err(Error::RowOutOfBounds { index: 9, count: 2, .. })
    ));
}

#[test]
fn test_recursion_depth_option() {
    let project = shop();

    // With no nesting allowed, [Ref].[Column] paths are cut off; LOOKUP
    // still finds the stored row, it just skips computing it
    let options = ComputeOptions::default().with_max_recursion_depth(0);
    let rows = project.compute_table_with_options("Orders", &options).unwrap();
    assert_eq!(rows[0]["c_subtotal"], Value::from(""));
    assert_eq!(rows[0]["c_total"], Value::from(""));
    assert_eq!(rows[0]["c_summary"], Value::from(": 3 x Apple"));
}

#[test]
fn test_pinned_now() {
    let project = Project::new()
        .with_table(
            Table::new("log", "Log")
                .with_column(Column::new("id", "ID", ColumnType::Text).with_key())
                .with_column(
                    Column::new("stamp", "Stamp", ColumnType::DateTime).with_formula("NOW()"),
                )
                .with_column(Column::new("day", "Day", ColumnType::Date).with_formula("TODAY()")),
        )
        .with_row("log", row([("id", "1")]))
        .with_row("log", row([("id", "2")]));

    let now = Utc.with_ymd_and_hms(2030, 1, 15, 8, 0, 0).unwrap();
    let rows = project
        .compute_table_with_options("Log", &ComputeOptions::default().with_now(now))
        .unwrap();

    for r in &rows {
        assert_eq!(r["stamp"], Value::from("2030-01-15T08:00:00.000Z"));
        assert_eq!(r["day"], Value::from("2030-01-15"));
    }
}

#[test]
fn test_circular_formulas_terminate() {
    // A and B each read the other through a self-referencing Ref column
    let project = Project::new()
        .with_table(
            Table::new("nodes", "Nodes")
                .with_column(Column::new("id", "ID", ColumnType::Text).with_key())
                .with_column(Column::new("next", "Next", ColumnType::Ref).with_ref("nodes"))
                .with_column(
                    Column::new("depth", "Depth", ColumnType::Number)
                        .with_formula("[Next].[Depth] + 1"),
                ),
        )
        .with_row("nodes", row([("id", "a"), ("next", "b")]))
        .with_row("nodes", row([("id", "b"), ("next", "a")]));

    let rows = project.compute_table("Nodes").unwrap();
    assert_eq!(rows.len(), 2);
    // The innermost row is not computed, so the chain ends in a blank and
    // blanks propagate through the arithmetic
    assert_eq!(rows[0]["depth"], Value::from(""));
}
