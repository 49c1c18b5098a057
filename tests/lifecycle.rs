//! End-to-end behaviour of the lifecycle store over the JSON backend

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use asset_register::audit::ActivityType;
use asset_register::auth::Session;
use asset_register::config::Settings;
use asset_register::hooks::default_registry;
use asset_register::lifecycle::LifecycleStore;
use asset_register::models::resources::{AUDIT, BATCHES, ITEMS, PLATFORMS};
use asset_register::models::{fields_from, Actor, Fields, Record, RecordId};
use asset_register::storage::{JsonStore, ListQuery, ListResult, Store};
use asset_register::{RegisterError, RegisterResult};

fn admin() -> Actor {
    Actor::new(RecordId::new(0), "admin", true)
}

fn settings(cascade: bool) -> Settings {
    Settings {
        cascade_item_deletes: cascade,
        ..Settings::default()
    }
}

fn dispatcher(inner: Arc<dyn Store>, actor: Option<Actor>, settings: &Settings) -> LifecycleStore {
    let session = match actor {
        Some(actor) => Session::signed_in(actor),
        None => Session::anonymous(),
    };
    LifecycleStore::builder(inner)
        .registry(default_registry(settings))
        .actors(Arc::new(session))
        .stamp_timeout(Duration::from_millis(100))
        .build()
}

fn setup() -> (Arc<JsonStore>, LifecycleStore) {
    let raw = Arc::new(JsonStore::in_memory());
    let store = dispatcher(raw.clone(), Some(admin()), &settings(false));
    (raw, store)
}

async fn audit_count(raw: &JsonStore) -> usize {
    raw.list(AUDIT, &ListQuery::all()).await.unwrap().total
}

async fn create_batch(store: &dyn Store, year: &str) -> Record {
    store
        .create(BATCHES, fields_from(json!({ "yearOfReceipt": year, "name": "Tapes" })))
        .await
        .unwrap()
}

/// Backend whose updates can be made to fail or stall
struct FlakyStore {
    inner: JsonStore,
    fail_updates: AtomicBool,
    update_delay_ms: AtomicU64,
}

impl FlakyStore {
    fn failing() -> Self {
        Self {
            inner: JsonStore::in_memory(),
            fail_updates: AtomicBool::new(true),
            update_delay_ms: AtomicU64::new(0),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            inner: JsonStore::in_memory(),
            fail_updates: AtomicBool::new(false),
            update_delay_ms: AtomicU64::new(delay.as_millis() as u64),
        }
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn create(&self, resource: &str, data: Fields) -> RegisterResult<Record> {
        self.inner.create(resource, data).await
    }

    async fn update(&self, resource: &str, id: RecordId, patch: Fields) -> RegisterResult<Record> {
        let delay = self.update_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RegisterError::Storage("disk full".into()));
        }
        self.inner.update(resource, id, patch).await
    }

    async fn delete(&self, resource: &str, id: RecordId) -> RegisterResult<Record> {
        self.inner.delete(resource, id).await
    }

    async fn get(&self, resource: &str, id: RecordId) -> RegisterResult<Record> {
        self.inner.get(resource, id).await
    }

    async fn list(&self, resource: &str, query: &ListQuery) -> RegisterResult<ListResult> {
        self.inner.list(resource, query).await
    }
}

#[tokio::test]
async fn test_batches_numbered_per_year() {
    let (_raw, store) = setup();

    let first = create_batch(&store, "2025").await;
    let second = create_batch(&store, "2025").await;
    let third = create_batch(&store, "2025").await;
    let other_year = create_batch(&store, "2024").await;

    assert_eq!(first.get_str("batchNumber"), Some("V00/2025"));
    assert_eq!(second.get_str("batchNumber"), Some("V01/2025"));
    assert_eq!(third.get_str("batchNumber"), Some("V02/2025"));
    assert_eq!(other_year.get_str("batchNumber"), Some("V00/2024"));
}

#[tokio::test]
async fn test_code_not_reissued_after_delete() {
    let (_raw, store) = setup();
    let first = create_batch(&store, "2025").await;
    let second = create_batch(&store, "2025").await;
    assert_eq!(second.get_str("batchNumber"), Some("V01/2025"));

    store.delete(BATCHES, first.id).await.unwrap();
    let third = create_batch(&store, "2025").await;

    assert_eq!(third.get_str("batchNumber"), Some("V02/2025"));
    assert_ne!(third.get_str("batchNumber"), second.get_str("batchNumber"));
}

#[tokio::test]
async fn test_stamped_code_survives_reread_and_edit() {
    let (_raw, store) = setup();
    let batch = create_batch(&store, "2025").await;

    let reread = store.get(BATCHES, batch.id).await.unwrap();
    assert_eq!(reread.get_str("batchNumber"), Some("V00/2025"));

    let edited = store
        .update(
            BATCHES,
            batch.id,
            fields_from(json!({ "name": "Reels", "batchNumber": "V99/2025" })),
        )
        .await
        .unwrap();
    assert_eq!(edited.get_str("batchNumber"), Some("V00/2025"));
    assert_eq!(edited.get_str("name"), Some("Reels"));
}

#[tokio::test]
async fn test_item_number_follows_item_id() {
    let (_raw, store) = setup();
    create_batch(&store, "2025").await;
    let batch = create_batch(&store, "2025").await;
    assert_eq!(batch.get_str("batchNumber"), Some("V01/2025"));

    let item = store
        .create(
            ITEMS,
            fields_from(json!({ "id": 4, "batchId": batch.id.value(), "mediaType": "DVD" })),
        )
        .await
        .unwrap();

    assert_eq!(item.id, RecordId::new(4));
    assert_eq!(item.get_str("item_number"), Some("V01/2025/05"));
}

#[tokio::test]
async fn test_item_for_missing_batch_is_rejected() {
    let (raw, store) = setup();

    let err = store
        .create(ITEMS, fields_from(json!({ "batchId": 42 })))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(raw.list(ITEMS, &ListQuery::all()).await.unwrap().total, 0);
    assert_eq!(audit_count(&raw).await, 0);
}

#[tokio::test]
async fn test_one_audit_entry_per_mutation() {
    let (raw, store) = setup();

    let batch = create_batch(&store, "2025").await;
    assert_eq!(audit_count(&raw).await, 1);

    store
        .update(BATCHES, batch.id, fields_from(json!({ "name": "Reels" })))
        .await
        .unwrap();
    assert_eq!(audit_count(&raw).await, 2);

    store.delete(BATCHES, batch.id).await.unwrap();
    assert_eq!(audit_count(&raw).await, 3);

    let history = store.audit().history(BATCHES, batch.id).await.unwrap();
    let activities: Vec<ActivityType> = history.iter().map(|e| e.activity_type).collect();
    assert_eq!(
        activities,
        vec![ActivityType::Create, ActivityType::Edit, ActivityType::Delete]
    );
    assert!(history.iter().all(|e| e.actor_id == RecordId::new(0)));
    assert_eq!(
        history[1].activity_detail,
        "Updated batch Reels: name: \"Tapes\" -> \"Reels\""
    );
}

#[tokio::test]
async fn test_no_actor_means_no_audit() {
    let raw = Arc::new(JsonStore::in_memory());
    let store = dispatcher(raw.clone(), None, &settings(false));

    let batch = create_batch(&store, "2025").await;
    assert_eq!(batch.get_str("batchNumber"), Some("V00/2025"));
    store.delete(BATCHES, batch.id).await.unwrap();

    assert_eq!(audit_count(&raw).await, 0);
}

#[tokio::test]
async fn test_rejected_create_writes_nothing() {
    let (raw, store) = setup();

    let err = store
        .create(BATCHES, fields_from(json!({ "yearOfReceipt": "25" })))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(raw.list(BATCHES, &ListQuery::all()).await.unwrap().total, 0);
    assert_eq!(audit_count(&raw).await, 0);
}

#[tokio::test]
async fn test_malformed_existing_code_blocks_new_batches() {
    let (raw, store) = setup();
    raw.create(
        BATCHES,
        fields_from(json!({ "yearOfReceipt": "2025", "batchNumber": "garbage" })),
    )
    .await
    .unwrap();
    raw.create(
        BATCHES,
        fields_from(json!({ "yearOfReceipt": "2025", "batchNumber": "V03/2025" })),
    )
    .await
    .unwrap();

    let err = store
        .create(BATCHES, fields_from(json!({ "yearOfReceipt": "2025" })))
        .await
        .unwrap_err();

    assert!(err.is_sequence());
    assert_eq!(raw.list(BATCHES, &ListQuery::all()).await.unwrap().total, 2);
}

#[tokio::test]
async fn test_unhooked_resource_passes_through() {
    let (raw, store) = setup();

    let record = store
        .create("notes", fields_from(json!({ "text": "hello" })))
        .await
        .unwrap();

    assert_eq!(record.get_str("text"), Some("hello"));
    assert!(record.get("createdAt").is_none());
    assert_eq!(audit_count(&raw).await, 0);
}

#[tokio::test]
async fn test_reference_data_is_audited_without_derived_fields() {
    let (raw, store) = setup();

    let platform = store
        .create(PLATFORMS, fields_from(json!({ "name": "Ship", "active": true })))
        .await
        .unwrap();
    store
        .update(PLATFORMS, platform.id, fields_from(json!({ "active": false })))
        .await
        .unwrap();

    let (entries, total) = store
        .audit()
        .entries(&ListQuery::all().filter_eq("resource", PLATFORMS))
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(entries[0].activity_detail, "Created platform Ship");
    assert_eq!(entries[1].activity_detail, "Updated platform Ship: active: true -> false");
    assert_eq!(audit_count(&raw).await, 2);
}

#[tokio::test]
async fn test_failed_stamp_is_queued_and_retried() {
    let flaky = Arc::new(FlakyStore::failing());
    let store = dispatcher(flaky.clone(), Some(admin()), &settings(false));

    let first = create_batch(&store, "2025").await;
    assert!(first.get("batchNumber").is_none());
    assert_eq!(store.pending_stamps().len(), 1);
    assert_eq!(store.pending_stamps()[0].value, "V00/2025");

    // The pending code still counts, so the next batch does not reuse it
    let second = create_batch(&store, "2025").await;
    assert!(second.get("batchNumber").is_none());
    let values: Vec<String> = store.pending_stamps().into_iter().map(|s| s.value).collect();
    assert_eq!(values, vec!["V00/2025", "V01/2025"]);

    // Both creates were still audited
    let audited = flaky.list(AUDIT, &ListQuery::all()).await.unwrap().total;
    assert_eq!(audited, 2);

    let report = store.retry_pending_stamps().await.unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.remaining, 2);
    assert!(store.pending_stamps().iter().all(|s| s.attempts == 2));

    flaky.fail_updates.store(false, Ordering::SeqCst);
    let report = store.retry_pending_stamps().await.unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.remaining, 0);
    assert!(store.pending_stamps().is_empty());

    let first = store.get(BATCHES, first.id).await.unwrap();
    let second = store.get(BATCHES, second.id).await.unwrap();
    assert_eq!(first.get_str("batchNumber"), Some("V00/2025"));
    assert_eq!(second.get_str("batchNumber"), Some("V01/2025"));
}

#[tokio::test]
async fn test_item_under_pending_batch_uses_pending_code() {
    let flaky = Arc::new(FlakyStore::failing());
    let store = dispatcher(flaky.clone(), Some(admin()), &settings(false));

    let batch = create_batch(&store, "2025").await;
    let item = store
        .create(ITEMS, fields_from(json!({ "batchId": batch.id.value() })))
        .await
        .unwrap();

    assert!(item.get("item_number").is_none());
    let pending = store.pending_stamps();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[1].resource, ITEMS);
    assert_eq!(pending[1].value, "V00/2025/01");
}

#[tokio::test]
async fn test_slow_stamp_times_out() {
    let slow = Arc::new(FlakyStore::slow(Duration::from_millis(500)));
    let store = dispatcher(slow.clone(), Some(admin()), &settings(false));

    let batch = create_batch(&store, "2025").await;

    assert!(batch.get("batchNumber").is_none());
    let pending = store.pending_stamps();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].reason.contains("timed out"));
}

#[tokio::test]
async fn test_retry_drops_stamp_for_deleted_record() {
    let flaky = Arc::new(FlakyStore::failing());
    let store = dispatcher(flaky.clone(), Some(admin()), &settings(false));

    let batch = create_batch(&store, "2025").await;
    store.delete(BATCHES, batch.id).await.unwrap();

    flaky.fail_updates.store(false, Ordering::SeqCst);
    let report = store.retry_pending_stamps().await.unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.remaining, 0);
    assert!(store.pending_stamps().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batches_get_distinct_numbers() {
    let raw = Arc::new(JsonStore::in_memory());
    let store = Arc::new(dispatcher(raw.clone(), Some(admin()), &settings(false)));

    let mut tasks = Vec::new();
    for _ in 0..12 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store
                .create(BATCHES, fields_from(json!({ "yearOfReceipt": "2025" })))
                .await
        }));
    }

    let mut numbers = HashSet::new();
    for task in tasks {
        let batch = task.await.unwrap().unwrap();
        let number = batch.get_str("batchNumber").unwrap().to_string();
        assert!(numbers.insert(number.clone()), "duplicate batch number {}", number);
    }
    assert_eq!(numbers.len(), 12);
    assert!(numbers.contains("V00/2025"));
    assert!(numbers.contains("V11/2025"));
    assert_eq!(audit_count(&raw).await, 12);
}

#[tokio::test]
async fn test_batch_delete_keeps_items_without_cascade() {
    let (raw, store) = setup();
    let batch = create_batch(&store, "2025").await;
    store
        .create(ITEMS, fields_from(json!({ "batchId": batch.id.value() })))
        .await
        .unwrap();
    let before = audit_count(&raw).await;

    store.delete(BATCHES, batch.id).await.unwrap();

    assert_eq!(audit_count(&raw).await, before + 1);
    assert_eq!(raw.list(ITEMS, &ListQuery::all()).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_batch_delete_cascades_to_items() {
    let raw = Arc::new(JsonStore::in_memory());
    let store = dispatcher(raw.clone(), Some(admin()), &settings(true));

    let batch = create_batch(&store, "2025").await;
    let keep = create_batch(&store, "2025").await;
    for batch_id in [batch.id, batch.id, keep.id] {
        store
            .create(ITEMS, fields_from(json!({ "batchId": batch_id.value() })))
            .await
            .unwrap();
    }
    let before = audit_count(&raw).await;

    store.delete(BATCHES, batch.id).await.unwrap();

    let items = raw.list(ITEMS, &ListQuery::all()).await.unwrap();
    assert_eq!(items.total, 1);
    assert_eq!(items.data[0].get_u64("batchId"), Some(keep.id.value()));

    // One entry for the batch plus one per cascaded item
    assert_eq!(audit_count(&raw).await, before + 3);
    let (cascaded, _) = store
        .audit()
        .entries(&ListQuery::all().filter_eq("activityType", "delete").filter_eq("resource", ITEMS))
        .await
        .unwrap();
    assert_eq!(cascaded.len(), 2);
    assert!(cascaded[0].activity_detail.ends_with("with batch Tapes"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_item_created_while_batch_stamp_is_retried() {
    let flaky = Arc::new(FlakyStore::failing());
    let store = Arc::new(dispatcher(flaky.clone(), Some(admin()), &settings(false)));
    let batch = create_batch(&*store, "2025").await;
    assert_eq!(store.pending_stamps().len(), 1);

    // The retried write lands only after the item create has started
    flaky.fail_updates.store(false, Ordering::SeqCst);
    flaky.update_delay_ms.store(60, Ordering::SeqCst);
    let retry = {
        let store = store.clone();
        tokio::spawn(async move { store.retry_pending_stamps().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let item = store
        .create(ITEMS, fields_from(json!({ "batchId": batch.id.value() })))
        .await
        .unwrap();
    assert_eq!(item.get_str("item_number"), Some("V00/2025/01"));

    let report = retry.await.unwrap().unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(report.remaining, 0);
    let batch = store.get(BATCHES, batch.id).await.unwrap();
    assert_eq!(batch.get_str("batchNumber"), Some("V00/2025"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cascade_leaves_no_orphans_under_concurrent_creates() {
    let raw = Arc::new(JsonStore::in_memory());
    let store = Arc::new(dispatcher(raw.clone(), Some(admin()), &settings(true)));
    let batch_id = create_batch(&*store, "2025").await.id;

    let mut creates = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        creates.push(tokio::spawn(async move {
            store
                .create(ITEMS, fields_from(json!({ "batchId": batch_id.value() })))
                .await
        }));
    }
    let delete = {
        let store = store.clone();
        tokio::spawn(async move { store.delete(BATCHES, batch_id).await })
    };

    delete.await.unwrap().unwrap();
    for create in creates {
        if let Err(e) = create.await.unwrap() {
            assert!(e.is_validation(), "unexpected error: {}", e);
        }
    }

    let orphans = raw
        .list(ITEMS, &ListQuery::all().filter_eq("batchId", batch_id.value()))
        .await
        .unwrap();
    assert_eq!(orphans.total, 0);
}
