//! Batch CLI commands

use clap::Subcommand;

use crate::display::{format_record_details, format_record_table};
use crate::error::RegisterResult;
use crate::models::batch::{NUMBER_FIELD, YEAR_FIELD};
use crate::models::resources::{BATCHES, ITEMS};
use crate::models::{item, RecordId};
use crate::storage::{ListQuery, SortOrder, Store};

use super::{parse_assignments, RegisterApp};

const LIST_COLUMNS: [&str; 4] = [NUMBER_FIELD, "name", YEAR_FIELD, "createdAt"];

/// Batch subcommands
#[derive(Subcommand)]
pub enum BatchCommands {
    /// Create a batch; its batch number is assigned automatically
    Create {
        /// Year of receipt (YYYY)
        #[arg(short, long)]
        year: String,
        /// Batch name
        #[arg(short, long)]
        name: Option<String>,
        /// Extra fields as key=value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// List batches
    List {
        /// Only batches received in this year
        #[arg(short, long)]
        year: Option<String>,
        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Batches per page
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a batch and its items
    Show {
        id: RecordId,
    },
    /// Edit batch fields
    Edit {
        id: RecordId,
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },
    /// Delete a batch
    Delete {
        id: RecordId,
    },
}

/// Handle a batch command
pub async fn handle_batch_command(app: &RegisterApp, cmd: BatchCommands) -> RegisterResult<()> {
    let store = app.store();

    match cmd {
        BatchCommands::Create { year, name, fields } => {
            let mut data = parse_assignments(&fields)?;
            data.insert(YEAR_FIELD.to_string(), year.into());
            if let Some(name) = name {
                data.insert("name".to_string(), name.into());
            }

            let batch = store.create(BATCHES, data).await?;
            match batch.get_str(NUMBER_FIELD) {
                Some(number) => println!("Created batch {}", number),
                None => {
                    println!("Created batch #{} (batch number pending)", batch.id);
                    println!("Run 'register stamps retry' to assign it.");
                }
            }
            println!("  ID: {}", batch.id);
        }

        BatchCommands::List {
            year,
            search,
            page,
            limit,
        } => {
            let mut query = ListQuery::all()
                .sort_by("id", SortOrder::Asc)
                .paginate(page, app.page_size(limit));
            if let Some(year) = year {
                query = query.filter_eq(YEAR_FIELD, year);
            }
            if let Some(term) = search {
                query = query.search(term);
            }

            let result = store.list(BATCHES, &query).await?;
            print!("{}", format_record_table(&result.data, &LIST_COLUMNS, result.total));
        }

        BatchCommands::Show { id } => {
            let batch = store.get(BATCHES, id).await?;
            print!("{}", format_record_details(BATCHES, &batch));

            let items = store
                .list(ITEMS, &ListQuery::all().filter_eq(item::BATCH_FIELD, id.value()))
                .await?;
            println!();
            println!("Items ({}):", items.total);
            print!(
                "{}",
                format_record_table(&items.data, &[item::NUMBER_FIELD, "mediaType"], items.total)
            );
        }

        BatchCommands::Edit { id, fields } => {
            let patch = parse_assignments(&fields)?;
            let batch = store.update(BATCHES, id, patch).await?;
            println!("Updated batch {}", batch.label());
        }

        BatchCommands::Delete { id } => {
            let batch = store.delete(BATCHES, id).await?;
            println!("Deleted batch {}", batch.label());
        }
    }

    Ok(())
}
