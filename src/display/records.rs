//! Record display formatting
//!
//! Formats records for terminal output in table and detail views.

use serde_json::Value;

use crate::hooks::PendingStamp;
use crate::models::Record;

/// Longest cell shown in a table before truncation
const MAX_CELL: usize = 32;

/// Render a field value for a table cell or detail line
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| display_value(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_CELL {
        let head: String = s.chars().take(MAX_CELL - 1).collect();
        format!("{}…", head)
    } else {
        s.to_string()
    }
}

/// Format records as a table with the given columns after `ID`
pub fn format_record_table(records: &[Record], columns: &[&str], total: usize) -> String {
    if records.is_empty() {
        return "No records found.\n".to_string();
    }

    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            std::iter::once(record.id.to_string())
                .chain(columns.iter().map(|c| truncate(&display_value(record.get(c)))))
                .collect()
        })
        .collect();

    let headers: Vec<&str> = std::iter::once("ID").chain(columns.iter().copied()).collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    let mut output = String::new();
    let line = |values: Vec<String>| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    output.push_str(&line(headers.iter().map(|h| h.to_string()).collect()));
    output.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in cells {
        output.push_str(&line(row));
    }

    if total > records.len() {
        output.push_str(&format!("\nShowing {} of {} records.\n", records.len(), total));
    }

    output
}

/// Format one record with every field on its own line
pub fn format_record_details(resource: &str, record: &Record) -> String {
    let mut output = format!("{} #{}\n", resource, record.id);

    let width = record.fields.keys().map(|k| k.len()).max().unwrap_or(0);
    let mut keys: Vec<&String> = record.fields.keys().collect();
    keys.sort();

    for key in keys {
        let value = if key == "password" {
            "********".to_string()
        } else {
            display_value(record.get(key))
        };
        output.push_str(&format!("  {:<width$}  {}\n", key, value, width = width));
    }

    output
}

/// Format the stamp retry queue
pub fn format_pending_stamps(stamps: &[PendingStamp]) -> String {
    if stamps.is_empty() {
        return "No pending stamps.\n".to_string();
    }

    let mut output = String::new();
    for stamp in stamps {
        output.push_str(&format!(
            "{}/{}  {} = {}  ({} attempt{}, last error: {})\n",
            stamp.resource,
            stamp.id,
            stamp.field,
            stamp.value,
            stamp.attempts,
            if stamp.attempts == 1 { "" } else { "s" },
            stamp.reason
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fields_from, RecordId};
    use serde_json::json;

    #[test]
    fn test_table_aligns_columns() {
        let records = vec![
            Record::new(RecordId::new(0), fields_from(json!({"batchNumber": "V00/2025"}))),
            Record::new(RecordId::new(10), fields_from(json!({"name": "x"}))),
        ];
        let output = format_record_table(&records, &["batchNumber", "name"], 2);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "ID  batchNumber  name");
        assert_eq!(lines[2], "0   V00/2025");
        assert_eq!(lines[3], "10               x");
    }

    #[test]
    fn test_table_reports_truncated_page() {
        let records = vec![Record::new(RecordId::new(0), fields_from(json!({"name": "a"})))];
        let output = format_record_table(&records, &["name"], 5);
        assert!(output.contains("Showing 1 of 5 records."));
    }

    #[test]
    fn test_details_mask_password() {
        let record = Record::new(
            RecordId::new(1),
            fields_from(json!({"name": "ian", "password": "$argon2id$..."})),
        );
        let output = format_record_details("users", &record);
        assert!(output.contains("users #1"));
        assert!(output.contains("********"));
        assert!(!output.contains("argon2"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_record_table(&[], &["name"], 0), "No records found.\n");
    }
}
