//! Low-stock classification.

use serde::{Deserialize, Serialize};

use crate::item::InventoryItem;

/// Stock level of an item relative to its threshold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockLevel {
    Ok,
    Low,
}

/// Classify a quantity: LOW iff it is strictly below the threshold.
pub fn evaluate(quantity: i64, threshold: i64) -> StockLevel {
    if quantity < threshold {
        StockLevel::Low
    } else {
        StockLevel::Ok
    }
}

/// Process-wide threshold configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThresholdPolicy {
    default_threshold: i64,
}

impl ThresholdPolicy {
    pub fn new(default_threshold: i64) -> Self {
        Self {
            default_threshold: default_threshold.max(0),
        }
    }

    pub fn default_threshold(&self) -> i64 {
        self.default_threshold
    }

    /// The item's own override wins over the configured default.
    pub fn threshold_for(&self, item: &InventoryItem) -> i64 {
        item.low_stock_threshold_override()
            .unwrap_or(self.default_threshold)
    }

    pub fn evaluate_item(&self, item: &InventoryItem) -> StockLevel {
        evaluate(item.quantity(), self.threshold_for(item))
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new(5)
    }
}
