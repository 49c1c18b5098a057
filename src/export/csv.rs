//! CSV Export functionality
//!
//! One row per record. Columns are `id` followed by every field name seen in
//! the records, sorted. Strings are written as-is, nulls and missing fields as
//! empty cells, anything else as compact JSON.

use std::collections::BTreeSet;
use std::io::Write;

use serde_json::Value;

use crate::error::{RegisterError, RegisterResult};
use crate::models::record::ID_FIELD;
use crate::models::Record;

/// Export records to CSV
pub fn export_records_csv<W: Write>(records: &[Record], writer: W) -> RegisterResult<()> {
    let columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.fields.keys().map(String::as_str))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);

    let header = std::iter::once(ID_FIELD).chain(columns.iter().copied());
    csv_writer
        .write_record(header)
        .map_err(|e| RegisterError::Export(e.to_string()))?;

    for record in records {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(record.id.to_string());
        for column in &columns {
            row.push(cell(record.get(column)));
        }
        csv_writer
            .write_record(&row)
            .map_err(|e| RegisterError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| RegisterError::Export(e.to_string()))?;
    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fields_from, RecordId};
    use serde_json::json;

    #[test]
    fn test_columns_are_union_of_fields() {
        let records = vec![
            Record::new(
                RecordId::new(0),
                fields_from(json!({"name": "Main, Vault", "active": true})),
            ),
            Record::new(RecordId::new(1), fields_from(json!({"name": "Annex", "floor": 2}))),
        ];

        let mut buffer = Vec::new();
        export_records_csv(&records, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "id,active,floor,name");
        assert_eq!(lines[1], "0,true,,\"Main, Vault\"");
        assert_eq!(lines[2], "1,,2,Annex");
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let mut buffer = Vec::new();
        export_records_csv(&[], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "id\n");
    }
}
