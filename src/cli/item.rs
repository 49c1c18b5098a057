//! Item CLI commands

use clap::Subcommand;

use crate::display::{format_record_details, format_record_table};
use crate::error::RegisterResult;
use crate::models::item::{BATCH_FIELD, NUMBER_FIELD};
use crate::models::resources::ITEMS;
use crate::models::RecordId;
use crate::services::{ItemFormService, SaveIntent};
use crate::storage::{ListQuery, SortOrder, Store};

use super::{parse_assignments, RegisterApp};

const LIST_COLUMNS: [&str; 4] = [NUMBER_FIELD, BATCH_FIELD, "mediaType", "remarks"];

/// Item subcommands
#[derive(Subcommand)]
pub enum ItemCommands {
    /// Create an item in a batch; its item number is assigned automatically
    Create {
        /// Id of the batch the item belongs to
        #[arg(short, long)]
        batch: RecordId,
        /// Item fields as key=value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        fields: Vec<String>,
        /// Print a copy of the input to start the next item from
        #[arg(long)]
        clone: bool,
    },
    /// List items
    List {
        /// Only items of this batch
        #[arg(short, long)]
        batch: Option<RecordId>,
        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Items per page
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show an item
    Show {
        id: RecordId,
    },
    /// Edit item fields
    Edit {
        id: RecordId,
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },
    /// Delete an item
    Delete {
        id: RecordId,
    },
}

/// Handle an item command
pub async fn handle_item_command(app: &RegisterApp, cmd: ItemCommands) -> RegisterResult<()> {
    let store = app.store();

    match cmd {
        ItemCommands::Create {
            batch,
            fields,
            clone,
        } => {
            let mut data = parse_assignments(&fields)?;
            data.insert(BATCH_FIELD.to_string(), batch.value().into());

            let intent = if clone {
                SaveIntent::SaveAndClone
            } else {
                SaveIntent::Save
            };
            let outcome = ItemFormService::new(app.dyn_store())
                .submit(data, intent)
                .await?;

            println!("{}", outcome.notice);
            println!("  ID: {}", outcome.item.id);
            if intent == SaveIntent::SaveAndClone {
                println!(
                    "  Next item: {}",
                    serde_json::Value::Object(outcome.next_draft)
                );
            }
        }

        ItemCommands::List {
            batch,
            search,
            page,
            limit,
        } => {
            let mut query = ListQuery::all()
                .sort_by("id", SortOrder::Asc)
                .paginate(page, app.page_size(limit));
            if let Some(batch) = batch {
                query = query.filter_eq(BATCH_FIELD, batch.value());
            }
            if let Some(term) = search {
                query = query.search(term);
            }

            let result = store.list(ITEMS, &query).await?;
            print!("{}", format_record_table(&result.data, &LIST_COLUMNS, result.total));
        }

        ItemCommands::Show { id } => {
            let item = store.get(ITEMS, id).await?;
            print!("{}", format_record_details(ITEMS, &item));
        }

        ItemCommands::Edit { id, fields } => {
            let patch = parse_assignments(&fields)?;
            let item = store.update(ITEMS, id, patch).await?;
            println!("Updated item {}", item.label());
        }

        ItemCommands::Delete { id } => {
            let item = store.delete(ITEMS, id).await?;
            println!("Deleted item {}", item.label());
        }
    }

    Ok(())
}
