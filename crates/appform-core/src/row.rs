//! Row and sample-data types

use std::collections::HashMap;

use ahash::RandomState;

use crate::value::Value;

/// A row of sample data, keyed by column id
pub type Row = HashMap<String, Value, RandomState>;

/// Sample rows for every table, keyed by table id
pub type SampleData = HashMap<String, Vec<Row>, RandomState>;

/// Build a row from `(column id, value)` pairs
pub fn row<I, K, V>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Rows stored for a table (empty when the table has no sample data)
pub fn rows_for<'a>(sample_data: &'a SampleData, table_id: &str) -> &'a [Row] {
    sample_data
        .get(table_id)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Find the first row whose trimmed value in `column_id` equals `key`
pub fn find_row_by_key<'a>(rows: &'a [Row], column_id: &str, key: &str) -> Option<&'a Row> {
    rows.iter().find(|r| {
        r.get(column_id)
            .map(Value::key_text)
            .unwrap_or_default()
            == key
    })
}
