use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfkeeper_core::{BlobRef, CollectionPath, Document, DomainError, DomainResult, EntryId, ItemId};

use crate::adjustment::{AdjustStock, StockAdjustmentEntry};

/// Top-level collection holding item documents.
pub const INVENTORY_COLLECTION: &str = "inventory";

/// Input for registering a new catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    pub isbn: Option<String>,
    pub low_stock_threshold_override: Option<i64>,
}

/// An item held in stock.
///
/// `quantity` is never negative and only changes through [`InventoryItem::plan_adjustment`]
/// followed by [`InventoryItem::apply_adjustment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    id: ItemId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    isbn: Option<String>,
    quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    low_stock_threshold_override: Option<i64>,
    #[serde(default)]
    cover_ref: Option<BlobRef>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Register a new item with zero stock.
    pub fn create(id: ItemId, input: NewItem, at: DateTime<Utc>) -> DomainResult<Self> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if let Some(threshold) = input.low_stock_threshold_override {
            if threshold < 0 {
                return Err(DomainError::validation("low stock threshold cannot be negative"));
            }
        }

        let isbn = input
            .isbn
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            id,
            title: title.to_string(),
            isbn,
            quantity: 0,
            low_stock_threshold_override: input.low_stock_threshold_override,
            cover_ref: None,
            created_at: at,
            updated_at: at,
        })
    }

    pub fn collection_path() -> CollectionPath {
        CollectionPath::root(INVENTORY_COLLECTION)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn low_stock_threshold_override(&self) -> Option<i64> {
        self.low_stock_threshold_override
    }

    pub fn cover_ref(&self) -> Option<&BlobRef> {
        self.cover_ref.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Decide the audit entry for an adjustment without mutating state.
    ///
    /// Rejects a command for another item, an invalid command, arithmetic
    /// overflow, and any delta that would leave the quantity negative.
    pub fn plan_adjustment(
        &self,
        cmd: &AdjustStock,
        entry_id: EntryId,
        at: DateTime<Utc>,
    ) -> DomainResult<StockAdjustmentEntry> {
        if cmd.item_id != self.id {
            return Err(DomainError::validation("command targets a different item"));
        }
        let reason = cmd.validate()?;

        let candidate = self
            .quantity
            .checked_add(cmd.delta)
            .ok_or_else(|| DomainError::validation("delta overflows the stock counter"))?;
        if candidate < 0 {
            return Err(DomainError::insufficient_stock(self.quantity, cmd.delta));
        }

        Ok(StockAdjustmentEntry {
            id: entry_id,
            item_id: self.id,
            delta: cmd.delta,
            previous_quantity: self.quantity,
            resulting_quantity: candidate,
            reason,
            note: cmd.note.clone().filter(|n| !n.trim().is_empty()),
            actor_id: cmd.actor_id,
            timestamp: at,
            source_platform: cmd.source_platform,
        })
    }

    /// Evolve state from an accepted entry.
    pub fn apply_adjustment(&mut self, entry: &StockAdjustmentEntry) {
        self.quantity = entry.resulting_quantity;
        self.updated_at = entry.timestamp;
    }

    /// Point the item at a new cover image.
    pub fn link_cover(&mut self, cover: BlobRef, at: DateTime<Utc>) {
        self.cover_ref = Some(cover);
        self.updated_at = at;
    }
}

impl Document for InventoryItem {
    const SCHEMA: &'static str = "inventory_item";

    fn collection(&self) -> CollectionPath {
        Self::collection_path()
    }

    fn document_id(&self) -> String {
        self.id.to_string()
    }

    fn validate(&self) -> DomainResult<()> {
        if self.quantity < 0 {
            return Err(DomainError::schema(format!(
                "item {} has negative quantity {}",
                self.id, self.quantity
            )));
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::schema(format!("item {} has an empty title", self.id)));
        }
        if matches!(self.low_stock_threshold_override, Some(t) if t < 0) {
            return Err(DomainError::schema(format!(
                "item {} has a negative low stock threshold",
                self.id
            )));
        }
        Ok(())
    }
}
