//! Integration tests across ledger, audit log, catalog and reconciler.
//!
//! Verifies:
//! - Stock never goes negative and every accepted adjustment leaves one entry
//! - Concurrent adjustments of one item lose no updates
//! - Write conflicts are retried a bounded number of times
//! - Reconciliation classifies, links, skips and reports per file
//! - Snapshots and listings see inventories larger than one query page

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::{Map as JsonMap, Value as JsonValue};
    use tokio_util::sync::CancellationToken;

    use shelfkeeper_audit::ActionKind;
    use shelfkeeper_core::{ActorId, BlobRef, CollectionPath, ItemId};
    use shelfkeeper_inventory::{AdjustStock, InventoryItem, NewItem, SourcePlatform, StockLevel, ThresholdPolicy};

    use crate::admin_log::{AdminActionLog, AuditFilter};
    use crate::blob_store::{BlobError, BlobStore, InMemoryBlobStore};
    use crate::catalog::Catalog;
    use crate::config::ReconcileConfig;
    use crate::document_store::{CommitRequest, DocumentStore, InMemoryDocumentStore, MAX_QUERY_LIMIT, Query, StoreError, StoredDocument};
    use crate::ledger::{LedgerError, StockLedger};
    use crate::reconcile::{FileStatus, ReconcileRequest, Reconciler, UploadedFile};
    use crate::retry::RetryPolicy;

    struct Harness<S: DocumentStore + 'static, B: BlobStore + 'static> {
        store: Arc<S>,
        blobs: Arc<B>,
        audit: Arc<AdminActionLog<S>>,
        ledger: Arc<StockLedger<S>>,
        catalog: Catalog<S>,
        reconciler: Reconciler<S, B>,
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::exponential(max_attempts, Duration::from_millis(1), Duration::from_millis(5))
    }

    fn harness_with<S, B>(store: Arc<S>, blobs: Arc<B>, retry: RetryPolicy, reconcile: ReconcileConfig) -> Harness<S, B>
    where
        S: DocumentStore + 'static,
        B: BlobStore + 'static,
    {
        let audit = Arc::new(AdminActionLog::new(store.clone()));
        Harness {
            ledger: Arc::new(StockLedger::new(
                store.clone(),
                audit.clone(),
                ThresholdPolicy::new(5),
                retry,
            )),
            catalog: Catalog::new(store.clone(), audit.clone()),
            reconciler: Reconciler::new(store.clone(), blobs.clone(), audit.clone(), reconcile),
            store,
            blobs,
            audit,
        }
    }

    fn harness() -> Harness<InMemoryDocumentStore, InMemoryBlobStore> {
        harness_with(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryBlobStore::default()),
            fast_retry(50),
            ReconcileConfig::default(),
        )
    }

    fn adjust(item_id: ItemId, delta: i64, reason: &str) -> AdjustStock {
        AdjustStock {
            item_id,
            delta,
            reason: reason.to_string(),
            note: None,
            actor_id: ActorId::new(),
            source_platform: SourcePlatform::Web,
        }
    }

    async fn add_item<S: DocumentStore + 'static, B: BlobStore + 'static>(
        h: &Harness<S, B>,
        title: &str,
        isbn: Option<&str>,
        quantity: i64,
    ) -> ItemId {
        let item = h
            .catalog
            .create_item(
                NewItem {
                    title: title.to_string(),
                    isbn: isbn.map(str::to_string),
                    low_stock_threshold_override: None,
                },
                ActorId::new(),
            )
            .await
            .unwrap();
        if quantity > 0 {
            h.ledger.apply_adjustment(adjust(item.id(), quantity, "Restock")).await.unwrap();
        }
        item.id()
    }

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: name.as_bytes().to_vec(),
        }
    }

    fn request(names: &[&str], overwrite: bool) -> ReconcileRequest {
        ReconcileRequest {
            files: names.iter().map(|n| file(n)).collect(),
            overwrite,
            dry_run: false,
            actor_id: ActorId::new(),
        }
    }

    async fn audit_records<S: DocumentStore + 'static>(
        audit: &AdminActionLog<S>,
        filter: AuditFilter,
        expected: usize,
    ) -> Vec<shelfkeeper_audit::AdminAuditRecord> {
        // Audit writes are detached; poll until they land.
        for _ in 0..100 {
            let records = audit.list(&filter, 100).await.unwrap();
            if records.len() >= expected {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        audit.list(&filter, 100).await.unwrap()
    }

    // ---------------------------------------------------------------------
    // Stock ledger
    // ---------------------------------------------------------------------

    #[tokio::test]
    async fn overdrawing_is_rejected_without_side_effects() {
        let h = harness();
        let id = add_item(&h, "Panchatantra", None, 3).await;

        let err = h.ledger.apply_adjustment(adjust(id, -5, "Theft")).await.unwrap_err();
        match err {
            LedgerError::InsufficientStock { available, delta, .. } => {
                assert_eq!(available, 3);
                assert_eq!(delta, -5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(h.ledger.item(id).await.unwrap().quantity(), 3);
        let history = h.ledger.history(id, 10).await.unwrap();
        assert_eq!(history.len(), 1, "only the initial restock is recorded");
    }

    #[tokio::test]
    async fn every_accepted_adjustment_leaves_a_consistent_entry() {
        let h = harness();
        let id = add_item(&h, "Upanishads", None, 0).await;

        let deltas = [10, -3, 4, -11, 2, -1];
        let mut accepted = 0;
        for delta in deltas {
            if h.ledger.apply_adjustment(adjust(id, delta, "Inventory Correction")).await.is_ok() {
                accepted += 1;
            }
        }

        let quantity = h.ledger.item(id).await.unwrap().quantity();
        let mut history = h.ledger.history(id, 100).await.unwrap();
        history.reverse();

        assert_eq!(history.len(), accepted);
        assert_eq!(history.iter().map(|e| e.delta).sum::<i64>(), quantity);
        let mut running = 0;
        for entry in &history {
            assert_eq!(entry.previous_quantity, running);
            assert_eq!(entry.resulting_quantity, running + entry.delta);
            assert!(entry.resulting_quantity >= 0);
            running = entry.resulting_quantity;
        }
        assert_eq!(running, quantity);
    }

    #[tokio::test]
    async fn low_stock_is_reported_after_commit() {
        let h = harness();
        let id = add_item(&h, "Jataka Tales", None, 6).await;

        let outcome = h.ledger.apply_adjustment(adjust(id, -1, "Customer Return")).await.unwrap();
        assert_eq!((outcome.new_quantity, outcome.stock_level), (5, StockLevel::Ok));

        let outcome = h.ledger.apply_adjustment(adjust(id, -1, "Damage/Loss")).await.unwrap();
        assert_eq!((outcome.new_quantity, outcome.stock_level), (4, StockLevel::Low));
        assert_eq!(outcome.threshold, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adjustments_lose_no_updates() {
        let h = harness();
        let id = add_item(&h, "Hitopadesha", None, 100).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let ledger = h.ledger.clone();
            let delta = if i % 2 == 0 { 2 } else { -1 };
            handles.push(tokio::spawn(async move {
                ledger.apply_adjustment(adjust(id, delta, "Inventory Correction")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(h.ledger.item(id).await.unwrap().quantity(), 100 + 20 - 10);
        assert_eq!(h.ledger.history(id, 100).await.unwrap().len(), 21);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_decrements_never_oversell() {
        let h = harness();
        let id = add_item(&h, "Kathasaritsagara", None, 5).await;

        let mut handles = Vec::new();
        for _ in 0..12 {
            let ledger = h.ledger.clone();
            handles.push(tokio::spawn(async move { ledger.apply_adjustment(adjust(id, -1, "Theft")).await }));
        }

        let mut ok = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(LedgerError::InsufficientStock { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!((ok, rejected), (5, 7));
        assert_eq!(h.ledger.item(id).await.unwrap().quantity(), 0);
    }

    /// Store whose transactional commits always lose the race.
    struct AlwaysConflicting {
        inner: InMemoryDocumentStore,
    }

    #[async_trait::async_trait]
    impl DocumentStore for AlwaysConflicting {
        async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<StoredDocument>, StoreError> {
            self.inner.get(collection, id).await
        }

        async fn query(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
            self.inner.query(collection, query).await
        }

        async fn merge(
            &self,
            collection: &CollectionPath,
            id: &str,
            fields: JsonMap<String, JsonValue>,
        ) -> Result<StoredDocument, StoreError> {
            self.inner.merge(collection, id, fields).await
        }

        async fn commit(&self, request: CommitRequest) -> Result<Vec<StoredDocument>, StoreError> {
            let first = request.writes.first().ok_or_else(|| StoreError::InvalidQuery("empty commit".into()))?;
            if first.collection == InventoryItem::collection_path() && first.expected == shelfkeeper_core::ExpectedRevision::Missing {
                // Item registration goes through.
                return self.inner.commit(request).await;
            }
            Err(StoreError::conflict(&first.collection, &first.id, "simulated interference"))
        }
    }

    #[tokio::test]
    async fn persistent_conflicts_exhaust_the_retry_budget() {
        let h = harness_with(
            Arc::new(AlwaysConflicting {
                inner: InMemoryDocumentStore::new(),
            }),
            Arc::new(InMemoryBlobStore::default()),
            fast_retry(3),
            ReconcileConfig::default(),
        );
        let id = add_item(&h, "Vetala Panchavimshati", None, 0).await;

        let err = h.ledger.apply_adjustment(adjust(id, 1, "Restock")).await.unwrap_err();
        assert!(matches!(err, LedgerError::TransactionConflict { attempts: 3, .. }), "{err:?}");
        assert_eq!(h.ledger.item(id).await.unwrap().quantity(), 0);
        assert!(h.store.inner.query(&shelfkeeper_inventory::StockAdjustmentEntry::collection_for(id), &Query::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn adjustments_are_mirrored_in_the_admin_log() {
        let h = harness();
        let id = add_item(&h, "Tirukkural", None, 4).await;

        let filter = AuditFilter {
            document_id: Some(id.to_string()),
            action_kind: Some(ActionKind::Update),
            ..Default::default()
        };
        let records = audit_records(&h.audit, filter, 1).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].collection_name, "inventory");
        assert_eq!(records[0].new_data.as_ref().unwrap()["quantity"], 4);
    }

    // ---------------------------------------------------------------------
    // Reconciliation
    // ---------------------------------------------------------------------

    #[tokio::test]
    async fn ambiguous_titles_are_conflicts_and_nothing_is_linked() {
        let h = harness();
        add_item(&h, "The Gita", None, 0).await;
        add_item(&h, "The-Gita", None, 0).await;

        let summary = h
            .reconciler
            .reconcile(request(&["the_gita.jpg"], true), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.conflicts, 1);
        assert_eq!(summary.details[0].status, FileStatus::Conflict);
        assert_eq!(summary.details[0].conflict_count, 2);
        assert!(h.blobs.is_empty());
    }

    #[tokio::test]
    async fn isbn_matches_win_over_titles() {
        let h = harness();
        let by_isbn = add_item(&h, "Some Other Title", Some("978-81-7276-001-2"), 0).await;
        add_item(&h, "9788172760012", None, 0).await;

        let summary = h
            .reconciler
            .reconcile(request(&["978-81-7276-001-2.png"], false), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.success, 1);
        assert_eq!(summary.details[0].item_id, Some(by_isbn));
    }

    #[tokio::test]
    async fn existing_covers_are_skipped_unless_overwriting() {
        let h = harness();
        let id = add_item(&h, "Arthashastra", None, 7).await;

        let first = h
            .reconciler
            .reconcile(request(&["arthashastra.jpg"], false), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(first.success, 1);
        let original = h.ledger.item(id).await.unwrap().cover_ref().cloned();
        assert!(original.is_some());

        let skipped = h
            .reconciler
            .reconcile(request(&["Arthashastra.png"], false), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!((skipped.success, skipped.skipped), (0, 1));
        assert_eq!(h.ledger.item(id).await.unwrap().cover_ref().cloned(), original);

        let replaced = h
            .reconciler
            .reconcile(request(&["Arthashastra.png"], true), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(replaced.success, 1);
        let item = h.ledger.item(id).await.unwrap();
        assert_ne!(item.cover_ref().cloned(), original);

        // Cover links never go through the ledger.
        assert_eq!(item.quantity(), 7);
        assert_eq!(h.ledger.history(id, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mixed_batch_is_summarized_per_file() {
        let h = harness();
        for title in ["Alpha", "Bravo", "Charlie", "Delta"] {
            add_item(&h, title, None, 0).await;
        }
        add_item(&h, "Echo", Some("111-222"), 0).await;
        add_item(&h, "Foxtrot", Some("333 444"), 0).await;
        add_item(&h, "Twin", None, 0).await;
        add_item(&h, "twin", None, 0).await;
        add_item(&h, "Pair Book", None, 0).await;
        add_item(&h, "pair-book", None, 0).await;

        let summary = h
            .reconciler
            .reconcile(
                request(
                    &[
                        "alpha.jpg",
                        "BRAVO.png",
                        "covers/charlie.jpeg",
                        "De lta.webp",
                        "111222.jpg",
                        "333_444.jpg",
                        "twin.jpg",
                        "pair_book.jpg",
                        "zulu.jpg",
                        "!!!.jpg",
                    ],
                    false,
                ),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            (summary.success, summary.skipped, summary.conflicts, summary.unmatched),
            (6, 0, 2, 2)
        );
        assert_eq!(summary.details.len(), 10);
        assert!(!summary.cancelled);
        assert_eq!(h.blobs.len(), 6);

        let links = audit_records(
            &h.audit,
            AuditFilter {
                action_kind: Some(ActionKind::Update),
                ..Default::default()
            },
            6,
        )
        .await;
        assert_eq!(links.len(), 6);
    }

    #[tokio::test]
    async fn dry_run_classifies_without_writing() {
        let h = harness();
        let id = add_item(&h, "Meghaduta", None, 0).await;

        let mut req = request(&["meghaduta.jpg"], false);
        req.dry_run = true;
        let summary = h.reconciler.reconcile(req, &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.success, 1);
        assert_eq!(summary.details[0].status, FileStatus::WouldLink);
        assert!(h.blobs.is_empty());
        assert!(h.ledger.item(id).await.unwrap().cover_ref().is_none());
    }

    #[tokio::test]
    async fn cancelled_batches_stop_before_the_next_file() {
        let h = harness();
        add_item(&h, "Raghuvamsha", None, 0).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = h
            .reconciler
            .reconcile(request(&["raghuvamsha.jpg"], false), &cancel)
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert!(summary.details.is_empty());
        assert!(h.blobs.is_empty());
    }

    struct BrokenBlobStore;

    #[async_trait::async_trait]
    impl BlobStore for BrokenBlobStore {
        async fn upload(&self, path: &str, _bytes: &[u8], _content_type: Option<&str>) -> Result<BlobRef, BlobError> {
            Err(BlobError::Upload {
                path: path.to_string(),
                reason: "bucket unreachable".to_string(),
            })
        }

        fn download_url(&self, blob: &BlobRef) -> String {
            blob.to_string()
        }
    }

    struct SlowBlobStore;

    #[async_trait::async_trait]
    impl BlobStore for SlowBlobStore {
        async fn upload(&self, path: &str, _bytes: &[u8], _content_type: Option<&str>) -> Result<BlobRef, BlobError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(BlobRef::new(path))
        }

        fn download_url(&self, blob: &BlobRef) -> String {
            blob.to_string()
        }
    }

    #[tokio::test]
    async fn upload_failures_do_not_abort_the_batch() {
        let h = harness_with(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(BrokenBlobStore),
            fast_retry(3),
            ReconcileConfig::default(),
        );
        add_item(&h, "Kumarasambhava", None, 0).await;
        add_item(&h, "Twin", None, 0).await;
        add_item(&h, "TWIN", None, 0).await;

        let summary = h
            .reconciler
            .reconcile(request(&["kumarasambhava.jpg", "twin.png"], false), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!((summary.success, summary.conflicts, summary.unmatched), (0, 1, 1));
        assert_eq!(summary.details[0].status, FileStatus::Failed);
        assert!(summary.details[0].detail.contains("bucket unreachable"));
    }

    #[tokio::test]
    async fn slow_uploads_time_out_per_file() {
        let h = harness_with(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(SlowBlobStore),
            fast_retry(3),
            ReconcileConfig {
                per_file_timeout: Duration::from_millis(20),
                ..ReconcileConfig::default()
            },
        );
        let id = add_item(&h, "Shakuntala", None, 0).await;

        let summary = h
            .reconciler
            .reconcile(request(&["shakuntala.jpg"], false), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.details[0].status, FileStatus::Failed);
        assert!(h.ledger.item(id).await.unwrap().cover_ref().is_none());
    }

    #[tokio::test]
    async fn cancellation_interrupts_an_in_flight_upload() {
        let h = harness_with(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(SlowBlobStore),
            fast_retry(3),
            ReconcileConfig::default(),
        );
        add_item(&h, "Kiratarjuniya", None, 0).await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let summary = h
            .reconciler
            .reconcile(request(&["kiratarjuniya.jpg"], false), &cancel)
            .await
            .unwrap();
        assert!(summary.cancelled);
        assert!(summary.details.is_empty());
    }

    /// Registers `count` items titled "Volume {n}" and returns their ids.
    async fn add_volumes<S: DocumentStore + 'static, B: BlobStore + 'static>(h: &Harness<S, B>, count: usize) -> Vec<(ItemId, String)> {
        let mut out = Vec::with_capacity(count);
        for n in 0..count {
            let title = format!("Volume {n}");
            let id = add_item(h, &title, None, 0).await;
            out.push((id, title));
        }
        // Store order: ascending document id.
        out.sort_by_key(|(id, _)| id.to_string());
        out
    }

    #[tokio::test]
    async fn snapshot_covers_inventories_larger_than_one_query_page() {
        let h = harness();
        let volumes = add_volumes(&h, MAX_QUERY_LIMIT + 100).await;
        let (last_id, last_title) = volumes[volumes.len() - 1].clone();
        let (near_last_id, near_last_title) = volumes[volumes.len() - 2].clone();

        // A same-titled twin makes the highest-id volume ambiguous.
        let twin = add_item(&h, &last_title, None, 0).await;

        let near_last_file = format!("{near_last_title}.jpg");
        let last_file = format!("{last_title}.jpg");
        let summary = h
            .reconciler
            .reconcile(
                request(&[near_last_file.as_str(), last_file.as_str()], false),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(summary.details.len(), 2);
        assert_eq!((summary.success, summary.conflicts, summary.unmatched), (1, 1, 0));

        assert_eq!(summary.details[0].status, FileStatus::Linked);
        assert_eq!(summary.details[0].item_id, Some(near_last_id));
        assert!(h.ledger.item(near_last_id).await.unwrap().cover_ref().is_some());

        assert_eq!(summary.details[1].status, FileStatus::Conflict);
        assert_eq!(summary.details[1].conflict_count, 2);
        assert!(h.ledger.item(last_id).await.unwrap().cover_ref().is_none());
        assert!(h.ledger.item(twin).await.unwrap().cover_ref().is_none());
    }

    #[tokio::test]
    async fn item_listing_is_complete_and_ordered_by_title() {
        let h = harness();
        let volumes = add_volumes(&h, MAX_QUERY_LIMIT + 5).await;

        let items = h.ledger.items().await.unwrap();
        assert_eq!(items.len(), volumes.len());
        assert!(items.windows(2).all(|w| w[0].title() <= w[1].title()));
        for (id, _) in &volumes {
            assert!(items.iter().any(|item| item.id() == *id), "{id} missing from listing");
        }
    }

    /// Store whose cover writes commit and then stall before acknowledging.
    struct LateAckStore {
        inner: InMemoryDocumentStore,
    }

    #[async_trait::async_trait]
    impl DocumentStore for LateAckStore {
        async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<StoredDocument>, StoreError> {
            self.inner.get(collection, id).await
        }

        async fn query(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
            self.inner.query(collection, query).await
        }

        async fn merge(
            &self,
            collection: &CollectionPath,
            id: &str,
            fields: JsonMap<String, JsonValue>,
        ) -> Result<StoredDocument, StoreError> {
            let stored = self.inner.merge(collection, id, fields).await?;
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(stored)
        }

        async fn commit(&self, request: CommitRequest) -> Result<Vec<StoredDocument>, StoreError> {
            self.inner.commit(request).await
        }
    }

    #[tokio::test]
    async fn timeouts_after_a_committed_write_report_the_link() {
        let h = harness_with(
            Arc::new(LateAckStore {
                inner: InMemoryDocumentStore::new(),
            }),
            Arc::new(InMemoryBlobStore::default()),
            fast_retry(3),
            ReconcileConfig {
                per_file_timeout: Duration::from_millis(50),
                ..ReconcileConfig::default()
            },
        );
        let id = add_item(&h, "Mrichchhakatika", None, 0).await;
        add_item(&h, "Uttararamacharita", None, 0).await;

        // A second file for the same item must see the confirmed link.
        let summary = h
            .reconciler
            .reconcile(
                request(&["mrichchhakatika.jpg", "mrichchhakatika.png"], false),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(summary.details[0].status, FileStatus::Linked);
        assert!(summary.details[0].detail.contains("confirmed after"));
        let stored = h.ledger.item(id).await.unwrap().cover_ref().cloned();
        assert_eq!(summary.details[0].cover_ref, stored);
        assert!(stored.is_some());

        assert_eq!(summary.details[1].status, FileStatus::Skipped);
        assert_eq!((summary.success, summary.skipped, summary.unmatched), (1, 1, 0));

        let links = audit_records(
            &h.audit,
            AuditFilter {
                document_id: Some(id.to_string()),
                action_kind: Some(ActionKind::Update),
                ..Default::default()
            },
            1,
        )
        .await;
        assert_eq!(links.len(), 1);
    }
}
