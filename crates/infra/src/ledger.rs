//! Stock ledger: the only writer of item quantities.
//!
//! ## Adjustment flow
//!
//! ```text
//! AdjustStock
//!   ↓
//! 1. Validate input (no store access)
//!   ↓
//! 2. Transaction: read item → plan entry → write item + create entry
//!   ↓      (write conflict → re-run step 2 with backoff, bounded)
//! 3. Commit (item and entry land together or not at all)
//!   ↓
//! 4. Threshold evaluation (read-only)
//!   ↓
//! 5. Admin audit record (detached, best-effort)
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use shelfkeeper_audit::{ActionKind, AdminAction};
use shelfkeeper_core::{DomainError, EntryId, ItemId};
use shelfkeeper_inventory::{
    AdjustStock, INVENTORY_COLLECTION, InventoryItem, StockAdjustmentEntry, StockLevel, ThresholdPolicy,
};

use crate::admin_log::AdminActionLog;
use crate::document_store::{DocumentStore, Query, SortDirection, StoreError, Transaction, codec, scan_collection};
use crate::retry::{Attempted, RetryPolicy, Retryable, retry_transient};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    #[error("invalid adjustment: {0}")]
    InvalidAdjustment(String),

    #[error("insufficient stock for item {item_id}: {available} available, adjustment of {delta} rejected")]
    InsufficientStock { item_id: ItemId, available: i64, delta: i64 },

    /// Concurrent writers kept invalidating the transaction until retries ran out.
    #[error("item {item_id} is being modified concurrently (gave up after {attempts} attempts)")]
    TransactionConflict { item_id: ItemId, attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    fn from_domain(item_id: ItemId, err: DomainError) -> Self {
        match err {
            DomainError::InsufficientStock { available, delta } => LedgerError::InsufficientStock {
                item_id,
                available,
                delta,
            },
            DomainError::NotFound(_) => LedgerError::ItemNotFound(item_id),
            other => LedgerError::InvalidAdjustment(other.to_string()),
        }
    }
}

impl Retryable for LedgerError {
    fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Store(err) if err.is_conflict())
    }
}

/// Result of an accepted adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentOutcome {
    pub entry: StockAdjustmentEntry,
    pub new_quantity: i64,
    pub threshold: i64,
    pub stock_level: StockLevel,
    /// Transaction executions it took (1 when uncontended).
    pub attempts: u32,
}

pub struct StockLedger<S> {
    store: Arc<S>,
    audit: Arc<AdminActionLog<S>>,
    thresholds: ThresholdPolicy,
    retry: RetryPolicy,
}

impl<S> StockLedger<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        audit: Arc<AdminActionLog<S>>,
        thresholds: ThresholdPolicy,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            audit,
            thresholds,
            retry,
        }
    }

    pub fn thresholds(&self) -> &ThresholdPolicy {
        &self.thresholds
    }

    /// Apply a signed stock delta atomically with its audit entry.
    #[instrument(
        skip(self, cmd),
        fields(item_id = %cmd.item_id, delta = cmd.delta, actor_id = %cmd.actor_id),
        err
    )]
    pub async fn apply_adjustment(&self, cmd: AdjustStock) -> Result<AdjustmentOutcome, LedgerError> {
        cmd.validate()
            .map_err(|e| LedgerError::from_domain(cmd.item_id, e))?;

        let cmd_ref = &cmd;
        let result = retry_transient(&self.retry, move |attempt| self.attempt_adjustment(cmd_ref, attempt)).await;

        let Attempted {
            value: (previous, entry),
            attempts,
        } = result.map_err(|Attempted { value, attempts }| {
            if value.is_retryable() {
                LedgerError::TransactionConflict {
                    item_id: cmd.item_id,
                    attempts,
                }
            } else {
                value
            }
        })?;

        let mut updated = previous.clone();
        updated.apply_adjustment(&entry);
        let threshold = self.thresholds.threshold_for(&updated);
        let stock_level = self.thresholds.evaluate_item(&updated);

        tracing::info!(
            entry_id = %entry.id,
            previous_quantity = entry.previous_quantity,
            new_quantity = entry.resulting_quantity,
            reason = %entry.reason,
            attempts,
            "stock adjusted"
        );
        if stock_level == StockLevel::Low {
            tracing::warn!(
                item_id = %entry.item_id,
                quantity = entry.resulting_quantity,
                threshold,
                "item is low on stock"
            );
        }

        self.audit.log_detached(
            AdminAction::new(
                entry.actor_id,
                ActionKind::Update,
                INVENTORY_COLLECTION,
                entry.item_id.to_string(),
                format!("stock adjusted by {} ({})", entry.delta, entry.reason),
            )
            .with_previous(json!({ "quantity": entry.previous_quantity }))
            .with_new(json!({ "quantity": entry.resulting_quantity, "entryId": entry.id })),
        );

        Ok(AdjustmentOutcome {
            new_quantity: entry.resulting_quantity,
            entry,
            threshold,
            stock_level,
            attempts,
        })
    }

    /// One read-validate-write pass. Returns the item as read plus the committed entry.
    async fn attempt_adjustment(
        &self,
        cmd: &AdjustStock,
        attempt: u32,
    ) -> Result<(InventoryItem, StockAdjustmentEntry), LedgerError> {
        let mut tx = Transaction::begin(self.store.as_ref());

        let item: InventoryItem = tx
            .get(&InventoryItem::collection_path(), &cmd.item_id.to_string())
            .await?
            .ok_or(LedgerError::ItemNotFound(cmd.item_id))?;

        let entry = item
            .plan_adjustment(cmd, EntryId::new(), Utc::now())
            .map_err(|e| LedgerError::from_domain(cmd.item_id, e))?;

        let mut updated = item.clone();
        updated.apply_adjustment(&entry);
        tx.set(&updated)?;
        tx.create(&entry)?;
        tx.commit().await?;

        if attempt > 1 {
            tracing::debug!(attempt, "adjustment committed after retry");
        }
        Ok((item, entry))
    }

    pub async fn item(&self, item_id: ItemId) -> Result<InventoryItem, LedgerError> {
        let stored = self
            .store
            .get(&InventoryItem::collection_path(), &item_id.to_string())
            .await?
            .ok_or(LedgerError::ItemNotFound(item_id))?;
        Ok(codec::decode(&stored)?)
    }

    /// Every item, ordered by title (ties by id). Reads the whole collection.
    pub async fn items(&self) -> Result<Vec<InventoryItem>, LedgerError> {
        let docs = scan_collection(self.store.as_ref(), &InventoryItem::collection_path(), &Query::all()).await?;
        let mut items = docs
            .iter()
            .map(|d| codec::decode::<InventoryItem>(d).map_err(LedgerError::from))
            .collect::<Result<Vec<_>, _>>()?;
        items.sort_by(|a, b| a.title().cmp(b.title()).then_with(|| a.id().cmp(&b.id())));
        Ok(items)
    }

    /// Adjustment entries of one item, newest first.
    pub async fn history(&self, item_id: ItemId, limit: usize) -> Result<Vec<StockAdjustmentEntry>, LedgerError> {
        // Distinguish "no entries" from "no such item".
        self.item(item_id).await?;

        let query = Query::all()
            .order_by("timestamp", SortDirection::Descending)
            .limit(limit);
        let docs = self
            .store
            .query(&StockAdjustmentEntry::collection_for(item_id), &query)
            .await?;
        docs.iter()
            .map(|d| codec::decode(d).map_err(LedgerError::from))
            .collect()
    }
}
