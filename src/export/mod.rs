//! Export module for the asset register
//!
//! Exports the records of any resource (the audit trail included) in
//! multiple formats:
//! - CSV: one row per record (spreadsheet-compatible)
//! - JSON: machine-readable, with schema version and metadata
//! - YAML: the JSON export in a human-readable form

pub mod csv;
pub mod json;
pub mod yaml;

use std::io::Write;

pub use self::csv::export_records_csv;
pub use json::{export_json, ResourceExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_yaml;

use crate::error::RegisterResult;

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Yaml,
}

/// Write an export in the chosen format
pub fn write_export<W: Write>(
    export: &ResourceExport,
    format: ExportFormat,
    writer: &mut W,
) -> RegisterResult<()> {
    match format {
        ExportFormat::Json => export_json(export, writer, true),
        ExportFormat::Csv => export_records_csv(&export.records, writer),
        ExportFormat::Yaml => export_yaml(export, writer),
    }
}
