//! Child rows that reference a parent row through Ref columns

use crate::column::Column;
use crate::row::{rows_for, Row, SampleData};
use crate::table::Table;
use crate::value::Value;

/// Rows of one child table pointing at the parent through one Ref column
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedSection<'a> {
    pub child_table: &'a Table,
    pub ref_column: &'a Column,
    /// `(row index, row)` pairs in sample-data order
    pub rows: Vec<(usize, &'a Row)>,
}

/// Collect every section of rows referencing `parent_row`.
///
/// Each Ref column of another table targeting `parent_table` yields one
/// section (possibly empty). The parent side of the match is the column
/// named by the Ref's `refColumnId`, else the parent's effective key.
pub fn related_rows<'a>(
    tables: &'a [Table],
    sample_data: &'a SampleData,
    parent_table: &Table,
    parent_row: &Row,
) -> Vec<RelatedSection<'a>> {
    let mut sections = Vec::new();

    for child_table in tables.iter().filter(|t| t.id != parent_table.id) {
        let ref_columns = child_table
            .columns
            .iter()
            .filter(|c| c.ref_table_id() == Some(parent_table.id.as_str()));

        for ref_column in ref_columns {
            let parent_column = ref_column
                .constraints
                .ref_column_id
                .as_deref()
                .or_else(|| parent_table.key_column_id());
            let parent_key = parent_column
                .and_then(|id| parent_row.get(id))
                .map(Value::key_text)
                .unwrap_or_default();

            let rows = if parent_key.is_empty() {
                Vec::new()
            } else {
                rows_for(sample_data, &child_table.id)
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| {
                        r.get(&ref_column.id)
                            .map(Value::key_text)
                            .map_or(false, |k| k == parent_key)
                    })
                    .collect()
            };

            sections.push(RelatedSection {
                child_table,
                ref_column,
                rows,
            });
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::row::row;

    #[test]
    fn test_related_rows() {
        let tables = vec![
            Table::new("customers", "Customers")
                .with_column(Column::new("cid", "ID", ColumnType::Text).with_key()),
            Table::new("orders", "Orders")
                .with_column(Column::new("oid", "ID", ColumnType::Text).with_key())
                .with_column(Column::new("cust", "Customer", ColumnType::Ref).with_ref("customers")),
            Table::new("notes", "Notes")
                .with_column(Column::new("nid", "ID", ColumnType::Text))
                .with_column(Column::new("about", "About", ColumnType::Text)),
        ];

        let mut data = SampleData::default();
        data.insert(
            "orders".into(),
            vec![
                row([("oid", "O1"), ("cust", "C1")]),
                row([("oid", "O2"), ("cust", "C2")]),
                row([("oid", "O3"), ("cust", " C1 ")]),
            ],
        );

        let parent = row([("cid", "C1")]);
        let sections = related_rows(&tables, &data, &tables[0], &parent);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].child_table.id, "orders");
        assert_eq!(sections[0].ref_column.id, "cust");
        let indices: Vec<usize> = sections[0].rows.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_blank_parent_key_matches_nothing() {
        let tables = vec![
            Table::new("p", "Parent").with_column(Column::new("k", "K", ColumnType::Text)),
            Table::new("c", "Child").with_column(Column::new("r", "R", ColumnType::Ref).with_ref("p")),
        ];
        let mut data = SampleData::default();
        data.insert("c".into(), vec![row([("r", "")])]);

        let sections = related_rows(&tables, &data, &tables[0], &row([("k", "  ")]));
        assert_eq!(sections.len(), 1);
        assert!(sections[0].rows.is_empty());
    }
}
