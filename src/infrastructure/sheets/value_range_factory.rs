use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::row::LeadRow;

/// Builds the `ValueRange` payloads `values_append` expects: row-major, every
/// cell a JSON string.
pub trait ValueRangeFactory {
    fn from_row(row: &LeadRow) -> Self;
    fn from_rows(rows: &[LeadRow]) -> Self;
}

fn wrap_cell(cell: &str) -> Value {
    Value::String(cell.to_owned())
}

impl ValueRangeFactory for ValueRange {
    fn from_row(row: &LeadRow) -> Self {
        Self::from_rows(std::slice::from_ref(row))
    }

    fn from_rows(rows: &[LeadRow]) -> Self {
        let values = rows
            .iter()
            .map(|row| row.iter().map(|cell| wrap_cell(cell)).collect())
            .collect::<Vec<Vec<Value>>>();

        ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(values),
        }
    }
}
