//! Generic record commands
//!
//! Work on any resource by name. Writes still go through the lifecycle
//! store, so hooked resources keep their hooks and audit trail.

use clap::Subcommand;

use crate::display::{format_record_details, format_record_table};
use crate::error::{RegisterError, RegisterResult};
use crate::export::{write_export, ExportFormat, ResourceExport};
use crate::models::resources::{AUDIT, USERS};
use crate::models::RecordId;
use crate::storage::{ListQuery, SortOrder, Store};

use super::{parse_assignments, RegisterApp};

/// Record subcommands
#[derive(Subcommand)]
pub enum RecordCommands {
    /// List records of a resource
    List {
        /// Resource name (e.g. projects, platforms, mediaType)
        resource: String,
        /// Equality filter as key=value (repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        filter: Vec<String>,
        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,
        /// Field to sort by
        #[arg(long, default_value = "id")]
        sort: String,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Records per page
        #[arg(short, long)]
        limit: Option<usize>,
        /// Columns to show besides the id
        #[arg(short, long, value_delimiter = ',', default_value = "name")]
        columns: Vec<String>,
    },
    /// Show one record
    Show {
        resource: String,
        id: RecordId,
    },
    /// Create a record
    Create {
        resource: String,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Update fields of a record
    Update {
        resource: String,
        id: RecordId,
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },
    /// Delete a record
    Delete {
        resource: String,
        id: RecordId,
    },
    /// Export every record of a resource
    Export {
        resource: String,
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

/// Handle a record command
pub async fn handle_record_command(app: &RegisterApp, cmd: RecordCommands) -> RegisterResult<()> {
    let store = app.store();

    match cmd {
        RecordCommands::List {
            resource,
            filter,
            search,
            sort,
            desc,
            page,
            limit,
            columns,
        } => {
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            let mut query = ListQuery::all()
                .sort_by(sort, order)
                .paginate(page, app.page_size(limit));
            for (key, value) in parse_assignments(&filter)? {
                query = query.filter_eq(key, value);
            }
            if let Some(term) = search {
                query = query.search(term);
            }

            let result = store.list(&resource, &query).await?;
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            print!("{}", format_record_table(&result.data, &columns, result.total));
        }

        RecordCommands::Show { resource, id } => {
            let record = store.get(&resource, id).await?;
            print!("{}", format_record_details(&resource, &record));
        }

        RecordCommands::Create { resource, fields } => {
            guard_write(app, &resource)?;
            let record = store.create(&resource, parse_assignments(&fields)?).await?;
            println!("Created {} #{}", resource, record.id);
        }

        RecordCommands::Update {
            resource,
            id,
            fields,
        } => {
            guard_write(app, &resource)?;
            let record = store.update(&resource, id, parse_assignments(&fields)?).await?;
            println!("Updated {} {}", resource, record.label());
        }

        RecordCommands::Delete { resource, id } => {
            guard_write(app, &resource)?;
            let record = store.delete(&resource, id).await?;
            println!("Deleted {} {}", resource, record.label());
        }

        RecordCommands::Export {
            resource,
            format,
            output,
        } => {
            let query = ListQuery::all().sort_by("id", SortOrder::Asc);
            let export = ResourceExport::from_store(store.as_ref(), &resource, &query).await?;
            write_to(&export, format, output.as_deref())?;
        }
    }

    Ok(())
}

/// The audit trail is append-only and user accounts are admin-only
fn guard_write(app: &RegisterApp, resource: &str) -> RegisterResult<()> {
    if resource == AUDIT {
        return Err(RegisterError::Validation(
            "The audit trail cannot be edited".into(),
        ));
    }
    if resource == USERS && !app.require_actor()?.admin {
        return Err(RegisterError::Auth(
            "Only administrators can manage users".into(),
        ));
    }
    Ok(())
}

/// Write an export to a file, or to stdout
pub(crate) fn write_to(
    export: &ResourceExport,
    format: ExportFormat,
    output: Option<&std::path::Path>,
) -> RegisterResult<()> {
    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .map_err(|e| RegisterError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
            write_export(export, format, &mut file)?;
            println!(
                "Exported {} {} record(s) to {}",
                export.record_count,
                export.resource,
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_export(export, format, &mut handle)?;
        }
    }
    Ok(())
}
