//! Human-readable row labels

use crate::column::Column;
use crate::row::{find_row_by_key, rows_for, Row, SampleData};
use crate::table::{table_by_id, Table};
use crate::value::Value;

/// Label for a row: the label columns' values joined by a space.
///
/// Uses the first column when no column is flagged as a label. Returns
/// `fallback` when every contributing value is blank.
pub fn row_label(table: &Table, row: &Row, fallback: &str) -> String {
    let mut columns: Vec<&Column> = table.label_columns().collect();
    if columns.is_empty() {
        columns.extend(table.columns.first());
    }

    let parts: Vec<String> = columns
        .iter()
        .map(|c| row.get(&c.id).map(Value::key_text).unwrap_or_default())
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        fallback.to_string()
    } else {
        parts.join(" ")
    }
}

/// Display text for a cell value.
///
/// Ref columns show the label of the referenced row when it can be found;
/// everything else (and unresolved refs) shows the trimmed raw value.
pub fn ref_display_label(
    tables: &[Table],
    sample_data: &SampleData,
    column: &Column,
    value: &Value,
) -> String {
    let raw = value.key_text();
    if raw.is_empty() {
        return raw;
    }

    let Some(target_id) = column.ref_table_id() else {
        return raw;
    };
    let Some(target) = table_by_id(tables, target_id) else {
        return raw;
    };
    let key_column = match column.constraints.ref_column_id.as_deref() {
        Some(id) => id,
        None => match target.key_column_id() {
            Some(id) => id,
            None => return raw,
        },
    };

    match find_row_by_key(rows_for(sample_data, target_id), key_column, &raw) {
        Some(ref_row) => {
            let label = row_label(target, ref_row, &raw);
            if label.is_empty() {
                raw
            } else {
                label
            }
        }
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::row::row;

    fn customers() -> Table {
        Table::new("customers", "Customers")
            .with_column(Column::new("cid", "ID", ColumnType::Text).with_key())
            .with_column(Column::new("first", "First", ColumnType::Name).with_label())
            .with_column(Column::new("last", "Last", ColumnType::Name).with_label())
    }

    #[test]
    fn test_row_label_joins_label_columns() {
        let t = customers();
        let r = row([("cid", "C1"), ("first", " Ada "), ("last", "Lovelace")]);
        assert_eq!(row_label(&t, &r, "?"), "Ada Lovelace");

        let r = row([("cid", "C2"), ("first", ""), ("last", "Hopper")]);
        assert_eq!(row_label(&t, &r, "?"), "Hopper");

        let r = row([("cid", "C3")]);
        assert_eq!(row_label(&t, &r, "?"), "?");
    }

    #[test]
    fn test_row_label_first_column_fallback() {
        let t = Table::new("t", "T")
            .with_column(Column::new("code", "Code", ColumnType::Text))
            .with_column(Column::new("desc", "Desc", ColumnType::Text));
        let r = row([("code", Value::from(42.0)), ("desc", Value::from("x"))]);
        assert_eq!(row_label(&t, &r, ""), "42");
    }

    #[test]
    fn test_ref_display_label() {
        let tables = vec![customers()];
        let mut data = SampleData::default();
        data.insert(
            "customers".into(),
            vec![row([("cid", "C1"), ("first", "Ada"), ("last", "Lovelace")])],
        );
        let col = Column::new("cust", "Customer", ColumnType::Ref).with_ref("customers");

        assert_eq!(
            ref_display_label(&tables, &data, &col, &Value::from(" C1 ")),
            "Ada Lovelace"
        );
        assert_eq!(ref_display_label(&tables, &data, &col, &Value::from("C9")), "C9");
        assert_eq!(ref_display_label(&tables, &data, &col, &Value::Null), "");

        let plain = Column::new("note", "Note", ColumnType::Text);
        assert_eq!(ref_display_label(&tables, &data, &plain, &Value::from("C1")), "C1");
    }
}
