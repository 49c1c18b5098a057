//! List queries: filter, sort, paginate
//!
//! Filters are field equality matches. An array filter value matches any of
//! its elements. The special `q` key is a case-insensitive substring search
//! over every string field of the record.

use std::cmp::Ordering;

use serde_json::Value;

use crate::models::record::ID_FIELD;
use crate::models::{Fields, Record};

/// Filter key for full-text search
pub const SEARCH_KEY: &str = "q";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

/// One-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

/// Parameters of a `list` call
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: Fields,
    pub sort: Option<Sort>,
    pub pagination: Option<Pagination>,
}

/// One page of records plus the total before pagination
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    pub data: Vec<Record>,
    pub total: usize,
}

impl ListQuery {
    /// Every record, in id order
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    /// Add a full-text search term
    pub fn search(self, term: impl Into<String>) -> Self {
        self.filter_eq(SEARCH_KEY, term.into())
    }

    /// Sort by a field
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            order,
        });
        self
    }

    /// Restrict to one page
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }

    /// Whether a record passes the filter
    pub fn matches(&self, record: &Record) -> bool {
        self.filter.iter().all(|(key, expected)| {
            if key == SEARCH_KEY {
                return matches_search(record, expected);
            }
            let actual = field_value(record, key);
            match expected {
                Value::Array(options) => options.iter().any(|option| loosely_equal(&actual, option)),
                single => loosely_equal(&actual, single),
            }
        })
    }

    /// Filter, sort and paginate a record set
    pub fn apply(&self, records: impl IntoIterator<Item = Record>) -> ListResult {
        let mut data: Vec<Record> = records.into_iter().filter(|r| self.matches(r)).collect();

        match &self.sort {
            Some(sort) => data.sort_by(|a, b| {
                let ordering = compare_values(&field_value(a, &sort.field), &field_value(b, &sort.field));
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            }),
            None => data.sort_by_key(|r| r.id),
        }

        let total = data.len();

        if let Some(Pagination { page, per_page }) = self.pagination {
            let start = page.saturating_sub(1).saturating_mul(per_page);
            data = data.into_iter().skip(start).take(per_page).collect();
        }

        ListResult { data, total }
    }
}

fn field_value(record: &Record, field: &str) -> Value {
    if field == ID_FIELD {
        Value::from(record.id.value())
    } else {
        record.get(field).cloned().unwrap_or(Value::Null)
    }
}

fn matches_search(record: &Record, term: &Value) -> bool {
    let Some(term) = term.as_str() else {
        return false;
    };
    let term = term.to_lowercase();
    record
        .fields
        .values()
        .filter_map(Value::as_str)
        .any(|value| value.to_lowercase().contains(&term))
}

// Numbers compare by value so `1` matches `1.0`, and numeric strings match
// numbers (command-line filters arrive as strings).
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(a), Value::String(b)) | (Value::String(b), Value::Number(a)) => {
            b.parse::<f64>().ok() == a.as_f64()
        }
        _ => actual == expected,
    }
}

// Nulls sort last; mixed types fall back to their JSON text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
