//! Audit trail commands

use clap::Subcommand;

use crate::display::format_audit_list;
use crate::error::RegisterResult;
use crate::export::{ExportFormat, ResourceExport};
use crate::models::resources::AUDIT;
use crate::models::RecordId;
use crate::storage::{ListQuery, SortOrder};

use super::record::write_to;
use super::RegisterApp;

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show recent audit entries, newest first
    List {
        /// Only entries about this resource
        #[arg(short, long)]
        resource: Option<String>,
        /// Only entries about this record id (requires --resource)
        #[arg(short, long, requires = "resource")]
        id: Option<RecordId>,
        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Export the audit trail
    Export {
        /// Only entries about this resource
        #[arg(short, long)]
        resource: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

/// Handle an audit command
pub async fn handle_audit_command(app: &RegisterApp, cmd: AuditCommands) -> RegisterResult<()> {
    let audit = app.store().audit();

    match cmd {
        AuditCommands::List {
            resource,
            id,
            limit,
        } => {
            let entries = match (resource, id) {
                (Some(resource), Some(id)) => {
                    let mut history = audit.history(&resource, id).await?;
                    history.reverse();
                    history.truncate(limit);
                    history
                }
                (resource, _) => {
                    let mut query = ListQuery::all()
                        .sort_by("id", SortOrder::Desc)
                        .paginate(1, limit.max(1));
                    if let Some(resource) = resource {
                        query = query.filter_eq("resource", resource);
                    }
                    audit.entries(&query).await?.0
                }
            };
            print!("{}", format_audit_list(&entries));
        }

        AuditCommands::Export {
            resource,
            format,
            output,
        } => {
            let mut query = ListQuery::all().sort_by("id", SortOrder::Asc);
            if let Some(resource) = resource {
                query = query.filter_eq("resource", resource);
            }
            let export = ResourceExport::from_store(app.raw().as_ref(), AUDIT, &query).await?;
            write_to(&export, format, output.as_deref())?;
        }
    }

    Ok(())
}
