//! YAML Export functionality
//!
//! Same content as the JSON export, for reading by people.

use std::io::Write;

use crate::error::{RegisterError, RegisterResult};
use crate::export::json::ResourceExport;

/// Export to YAML format
pub fn export_yaml<W: Write>(export: &ResourceExport, writer: &mut W) -> RegisterResult<()> {
    let header = format!(
        "# Asset register export: {}\n# Generated: {}\n# App Version: {}\n\n",
        export.resource, export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| RegisterError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, export).map_err(|e| RegisterError::Export(e.to_string()))?;

    Ok(())
}
