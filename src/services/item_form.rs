//! Item form submission
//!
//! Saving an item either clears the form or pre-fills it with a copy of the
//! item just saved, so a run of similar items can be entered quickly. The
//! choice is an explicit `SaveIntent` per submission.

use std::sync::Arc;

use crate::error::RegisterResult;
use crate::hooks::{CREATED_AT, CREATED_BY};
use crate::models::record::ID_FIELD;
use crate::models::resources::ITEMS;
use crate::models::{item, Fields, Record};
use crate::storage::Store;

/// What the form shows after a save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveIntent {
    /// Start from a blank form
    #[default]
    Save,
    /// Start from a copy of the saved item
    SaveAndClone,
}

/// Result of a submission
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The item as stored, derived fields included
    pub item: Record,
    /// Initial values for the next form
    pub next_draft: Fields,
    /// Message for the user
    pub notice: String,
}

/// Creates items through the lifecycle dispatcher
pub struct ItemFormService {
    store: Arc<dyn Store>,
}

impl ItemFormService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, data: Fields, intent: SaveIntent) -> RegisterResult<SubmitOutcome> {
        let next_draft = match intent {
            SaveIntent::Save => Fields::new(),
            SaveIntent::SaveAndClone => clone_draft(&data),
        };

        let item = self.store.create(ITEMS, data).await?;

        let number = item
            .get_str(item::NUMBER_FIELD)
            .map(str::to_string)
            .unwrap_or_else(|| item.label());
        let showing = match intent {
            SaveIntent::Save => "blank",
            SaveIntent::SaveAndClone => "clone of previous",
        };

        Ok(SubmitOutcome {
            notice: format!(
                "Item {} has been saved. Now showing {} item.",
                number, showing
            ),
            item,
            next_draft,
        })
    }
}

/// The submitted values minus anything the store or hooks derive
fn clone_draft(data: &Fields) -> Fields {
    let mut draft = data.clone();
    draft.remove(ID_FIELD);
    draft.remove(item::NUMBER_FIELD);
    draft.remove(CREATED_AT);
    draft.remove(CREATED_BY);
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::hooks::default_registry;
    use crate::lifecycle::LifecycleStore;
    use crate::models::fields_from;
    use crate::models::resources::BATCHES;
    use crate::storage::JsonStore;
    use serde_json::json;

    async fn service() -> ItemFormService {
        let store = LifecycleStore::builder(Arc::new(JsonStore::in_memory()))
            .registry(default_registry(&Settings::default()))
            .build();
        store
            .create(BATCHES, fields_from(json!({"yearOfReceipt": "2025"})))
            .await
            .unwrap();
        ItemFormService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_save_clears_form() {
        let service = service().await;
        let outcome = service
            .submit(fields_from(json!({"batchId": 0, "mediaType": "DVD"})), SaveIntent::Save)
            .await
            .unwrap();

        assert_eq!(outcome.item.get_str("item_number"), Some("V00/2025/01"));
        assert!(outcome.next_draft.is_empty());
        assert_eq!(
            outcome.notice,
            "Item V00/2025/01 has been saved. Now showing blank item."
        );
    }

    #[tokio::test]
    async fn test_save_and_clone_keeps_input() {
        let service = service().await;
        let outcome = service
            .submit(
                fields_from(json!({"id": 3, "batchId": 0, "mediaType": "DVD", "item_number": "X"})),
                SaveIntent::SaveAndClone,
            )
            .await
            .unwrap();

        assert_eq!(outcome.item.get_str("item_number"), Some("V00/2025/04"));
        assert_eq!(
            outcome.next_draft,
            fields_from(json!({"batchId": 0, "mediaType": "DVD"}))
        );
        assert_eq!(
            outcome.notice,
            "Item V00/2025/04 has been saved. Now showing clone of previous item."
        );

        // The clone submits cleanly as the next item
        let next = service
            .submit(outcome.next_draft, SaveIntent::Save)
            .await
            .unwrap();
        assert_eq!(next.item.get_str("item_number"), Some("V00/2025/05"));
    }
}
