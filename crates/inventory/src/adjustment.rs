use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfkeeper_core::{ActorId, CollectionPath, Document, DomainError, DomainResult, EntryId, ItemId};

use crate::item::InventoryItem;

/// Why a stock correction was made.
///
/// A closed set of categories covers the common cases; anything else is kept
/// verbatim as free text. Blank reasons are not representable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AdjustmentReason {
    Restock,
    DamageOrLoss,
    Correction,
    CustomerReturn,
    Theft,
    Other(String),
}

impl AdjustmentReason {
    /// Parse a reason label. Category labels match case-insensitively.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("reason cannot be empty"));
        }

        let reason = match trimmed.to_lowercase().as_str() {
            "restock" => AdjustmentReason::Restock,
            "damage/loss" | "damage" | "loss" => AdjustmentReason::DamageOrLoss,
            "inventory correction" | "correction" => AdjustmentReason::Correction,
            "customer return" | "return" => AdjustmentReason::CustomerReturn,
            "theft" => AdjustmentReason::Theft,
            _ => AdjustmentReason::Other(trimmed.to_string()),
        };
        Ok(reason)
    }

    pub fn label(&self) -> &str {
        match self {
            AdjustmentReason::Restock => "Restock",
            AdjustmentReason::DamageOrLoss => "Damage/Loss",
            AdjustmentReason::Correction => "Inventory Correction",
            AdjustmentReason::CustomerReturn => "Customer Return",
            AdjustmentReason::Theft => "Theft",
            AdjustmentReason::Other(text) => text,
        }
    }
}

impl TryFrom<String> for AdjustmentReason {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AdjustmentReason::parse(&value)
    }
}

impl From<AdjustmentReason> for String {
    fn from(value: AdjustmentReason) -> Self {
        value.label().to_string()
    }
}

impl core::fmt::Display for AdjustmentReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Client surface an adjustment was submitted from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePlatform {
    Web,
    Mobile,
    Api,
    Internal,
}

impl SourcePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourcePlatform::Web => "web",
            SourcePlatform::Mobile => "mobile",
            SourcePlatform::Api => "api",
            SourcePlatform::Internal => "internal",
        }
    }
}

/// Command: adjust the stock of one item by a signed delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub item_id: ItemId,
    pub delta: i64,
    pub reason: String,
    pub note: Option<String>,
    pub actor_id: ActorId,
    pub source_platform: SourcePlatform,
}

impl AdjustStock {
    /// Input checks that need no stored state. Runs before any transaction opens.
    pub fn validate(&self) -> DomainResult<AdjustmentReason> {
        if self.delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }
        AdjustmentReason::parse(&self.reason)
    }
}

/// Immutable, append-only record of one accepted adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentEntry {
    pub id: EntryId,
    pub item_id: ItemId,
    pub delta: i64,
    pub previous_quantity: i64,
    pub resulting_quantity: i64,
    pub reason: AdjustmentReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub actor_id: ActorId,
    pub timestamp: DateTime<Utc>,
    pub source_platform: SourcePlatform,
}

impl StockAdjustmentEntry {
    /// Sub-collection holding the entries of one item.
    pub fn collection_for(item_id: ItemId) -> CollectionPath {
        InventoryItem::collection_path().sub(&item_id.to_string(), "stock_adjustments")
    }
}

impl Document for StockAdjustmentEntry {
    const SCHEMA: &'static str = "stock_adjustment";

    fn collection(&self) -> CollectionPath {
        Self::collection_for(self.item_id)
    }

    fn document_id(&self) -> String {
        self.id.to_string()
    }

    fn validate(&self) -> DomainResult<()> {
        if self.delta == 0 {
            return Err(DomainError::schema("stock adjustment with zero delta"));
        }
        if self.resulting_quantity < 0 || self.previous_quantity < 0 {
            return Err(DomainError::schema("stock adjustment with negative quantity"));
        }
        if self.previous_quantity.checked_add(self.delta) != Some(self.resulting_quantity) {
            return Err(DomainError::schema(format!(
                "stock adjustment does not add up ({} + {} != {})",
                self.previous_quantity, self.delta, self.resulting_quantity
            )));
        }
        Ok(())
    }
}
