//! Inventory domain module.
//!
//! This crate contains the business rules for stock keeping, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod adjustment;
pub mod item;
pub mod matching;
pub mod threshold;

pub use adjustment::{AdjustStock, AdjustmentReason, SourcePlatform, StockAdjustmentEntry};
pub use item::{INVENTORY_COLLECTION, InventoryItem, NewItem};
pub use matching::{MatchCandidate, MatchIndex, MatchTier, Resolution, file_key, normalize_key};
pub use threshold::{StockLevel, ThresholdPolicy, evaluate};
