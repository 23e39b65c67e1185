use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfkeeper_core::{EntryId, ItemId};
use shelfkeeper_infra::{BlobStore, UploadedFile};
use shelfkeeper_inventory::{InventoryItem, SourcePlatform, StockLevel, ThresholdPolicy};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    pub item_id: String,
    pub delta: i64,
    pub reason: String,
    pub note: Option<String>,
    pub source_platform: Option<SourcePlatform>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub title: String,
    pub isbn: Option<String>,
    pub low_stock_threshold_override: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    pub file_name: String,
    pub content_base64: String,
    pub content_type: Option<String>,
}

impl UploadFileRequest {
    pub fn decode(self) -> Result<UploadedFile, String> {
        let bytes = STANDARD
            .decode(self.content_base64.trim())
            .map_err(|e| format!("file '{}' is not valid base64: {e}", self.file_name))?;
        Ok(UploadedFile {
            file_name: self.file_name,
            content_type: self.content_type,
            bytes,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub files: Vec<UploadFileRequest>,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub collection: Option<String>,
    pub document_id: Option<String>,
    pub action: Option<String>,
    pub limit: Option<usize>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustResponse {
    pub item_id: ItemId,
    pub entry_id: EntryId,
    pub new_quantity: i64,
    pub stock_level: StockLevel,
    pub threshold: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    pub quantity: i64,
    pub threshold: i64,
    pub stock_level: StockLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold_override: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemView {
    pub fn from_item(item: &InventoryItem, thresholds: &ThresholdPolicy, blobs: &dyn BlobStore) -> Self {
        Self {
            id: item.id(),
            title: item.title().to_string(),
            isbn: item.isbn().map(str::to_string),
            quantity: item.quantity(),
            threshold: thresholds.threshold_for(item),
            stock_level: thresholds.evaluate_item(item),
            low_stock_threshold_override: item.low_stock_threshold_override(),
            cover_url: item.cover_ref().map(|c| blobs.download_url(c)),
            created_at: item.created_at(),
            updated_at: item.updated_at(),
        }
    }
}
