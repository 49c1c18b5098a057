//! JSON Export functionality
//!
//! Exports the records of one resource with schema versioning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{RegisterError, RegisterResult};
use crate::models::Record;
use crate::storage::{ListQuery, Store};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Export of one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// Resource the records belong to
    pub resource: String,

    pub record_count: usize,

    pub records: Vec<Record>,
}

impl ResourceExport {
    pub fn new(resource: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            resource: resource.into(),
            record_count: records.len(),
            records,
        }
    }

    /// Collect every record of `resource` matching `query`
    pub async fn from_store(
        store: &dyn Store,
        resource: &str,
        query: &ListQuery,
    ) -> RegisterResult<Self> {
        let result = store.list(resource, query).await?;
        Ok(Self::new(resource, result.data))
    }
}

/// Write an export as JSON
pub fn export_json<W: Write>(
    export: &ResourceExport,
    writer: &mut W,
    pretty: bool,
) -> RegisterResult<()> {
    let written = if pretty {
        serde_json::to_writer_pretty(&mut *writer, export)
    } else {
        serde_json::to_writer(&mut *writer, export)
    };
    written.map_err(|e| RegisterError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| RegisterError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fields_from, RecordId};
    use serde_json::json;

    #[test]
    fn test_export_json_round_trip() {
        let records = vec![Record::new(
            RecordId::new(0),
            fields_from(json!({"name": "Main Vault"})),
        )];
        let export = ResourceExport::new("vaultLocation", records);

        let mut buffer = Vec::new();
        export_json(&export, &mut buffer, true).unwrap();

        let parsed: ResourceExport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.resource, "vaultLocation");
        assert_eq!(parsed.record_count, 1);
        assert_eq!(parsed.records[0].get_str("name"), Some("Main Vault"));
    }
}
