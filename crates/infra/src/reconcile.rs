//! Cover image reconciliation.
//!
//! A batch of uploaded files is matched against one inventory snapshot by
//! normalized ISBN, then normalized title. Unique matches get the file
//! uploaded and linked as the item's cover; everything else is reported. The
//! stock ledger is never involved: linking a cover is a single-document field
//! update that does not touch `quantity`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map as JsonMap, json};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use shelfkeeper_audit::{ActionKind, AdminAction};
use shelfkeeper_core::{ActorId, BlobRef, ItemId};
use shelfkeeper_inventory::{INVENTORY_COLLECTION, InventoryItem, MatchIndex, MatchTier, Resolution};

use crate::admin_log::AdminActionLog;
use crate::blob_store::{BlobError, BlobStore, cover_path};
use crate::config::ReconcileConfig;
use crate::document_store::{DocumentStore, Query, StoreError, codec, scan_collection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    pub files: Vec<UploadedFile>,
    /// Replace covers that are already set.
    pub overwrite: bool,
    /// Classify only; nothing is uploaded or written.
    pub dry_run: bool,
    pub actor_id: ActorId,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileStatus {
    Linked,
    /// Would have been linked (dry run).
    WouldLink,
    Skipped,
    Conflict,
    Unmatched,
    /// Matched, but upload or cover write failed (or timed out).
    Failed,
}

/// Per-file line of a [`ReconcileSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub file_name: String,
    pub normalized_key: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<MatchTier>,
    #[serde(skip_serializing_if = "is_zero")]
    pub conflict_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_ref: Option<BlobRef>,
    pub detail: String,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub success: usize,
    pub skipped: usize,
    pub conflicts: usize,
    /// No match, plus matched files whose upload or write failed.
    pub unmatched: usize,
    pub cancelled: bool,
    pub details: Vec<FileOutcome>,
}

impl ReconcileSummary {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome.status {
            FileStatus::Linked | FileStatus::WouldLink => self.success += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Conflict => self.conflicts += 1,
            FileStatus::Unmatched | FileStatus::Failed => self.unmatched += 1,
        }
        self.details.push(outcome);
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The inventory snapshot could not be taken; no file was processed.
    #[error("failed to load inventory snapshot: {0}")]
    Snapshot(#[from] StoreError),
}

#[derive(Debug, Error)]
enum LinkError {
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Reconciler<S, B> {
    store: Arc<S>,
    blobs: Arc<B>,
    audit: Arc<AdminActionLog<S>>,
    config: ReconcileConfig,
}

impl<S, B> Reconciler<S, B>
where
    S: DocumentStore + 'static,
    B: BlobStore + 'static,
{
    pub fn new(store: Arc<S>, blobs: Arc<B>, audit: Arc<AdminActionLog<S>>, config: ReconcileConfig) -> Self {
        Self {
            store,
            blobs,
            audit,
            config,
        }
    }

    /// Process a batch sequentially against one inventory snapshot.
    ///
    /// Per-file failures are summary lines, never errors. Cancellation is
    /// observed before each file and while a file is in flight; the partial
    /// summary is returned with `cancelled` set, and the interrupted file is
    /// left out of it.
    #[instrument(
        skip_all,
        fields(files = request.files.len(), overwrite = request.overwrite, dry_run = request.dry_run)
    )]
    pub async fn reconcile(
        &self,
        request: ReconcileRequest,
        cancel: &CancellationToken,
    ) -> Result<ReconcileSummary, ReconcileError> {
        let snapshot = self.snapshot().await?;
        let index = MatchIndex::build(snapshot.values());
        let mut linked_in_batch: HashSet<ItemId> = HashSet::new();
        let mut summary = ReconcileSummary::default();

        for file in &request.files {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let candidate = index.candidate(&file.file_name);
            let base = FileOutcome {
                file_name: file.file_name.clone(),
                normalized_key: candidate.normalized_key.clone(),
                status: FileStatus::Unmatched,
                item_id: None,
                tier: None,
                conflict_count: 0,
                cover_ref: None,
                detail: String::new(),
            };

            let outcome = match candidate.resolution {
                Resolution::NoMatch => FileOutcome {
                    detail: if base.normalized_key.is_empty() {
                        "file name has no matchable characters".to_string()
                    } else {
                        "no item matches this name or ISBN".to_string()
                    },
                    ..base
                },
                Resolution::Ambiguous { tier, item_ids } => FileOutcome {
                    status: FileStatus::Conflict,
                    tier: Some(tier),
                    conflict_count: item_ids.len(),
                    detail: format!("{} items share this {}", item_ids.len(), tier_label(tier)),
                    ..base
                },
                Resolution::Unique { item_id, tier } => {
                    let Some(item) = snapshot.get(&item_id) else {
                        tracing::error!(file = %file.file_name, item_id = %item_id, "match points outside the snapshot");
                        summary.record(FileOutcome {
                            status: FileStatus::Failed,
                            item_id: Some(item_id),
                            tier: Some(tier),
                            detail: "matched item is missing from the snapshot".to_string(),
                            ..base
                        });
                        continue;
                    };
                    let base = FileOutcome {
                        item_id: Some(item_id),
                        tier: Some(tier),
                        ..base
                    };
                    let has_cover = item.cover_ref().is_some() || linked_in_batch.contains(&item_id);

                    if has_cover && !request.overwrite {
                        FileOutcome {
                            status: FileStatus::Skipped,
                            detail: format!("'{}' already has a cover", item.title()),
                            ..base
                        }
                    } else if request.dry_run {
                        FileOutcome {
                            status: FileStatus::WouldLink,
                            detail: format!("would link to '{}' by {}", item.title(), tier_label(tier)),
                            ..base
                        }
                    } else {
                        let linked = tokio::select! {
                            _ = cancel.cancelled() => None,
                            res = tokio::time::timeout(
                                self.config.per_file_timeout,
                                self.link(item, file, request.actor_id),
                            ) => Some(res),
                        };

                        match linked {
                            None => {
                                summary.cancelled = true;
                                break;
                            }
                            Some(Ok(Ok(cover))) => {
                                linked_in_batch.insert(item_id);
                                FileOutcome {
                                    status: FileStatus::Linked,
                                    detail: format!("linked to '{}' by {}", item.title(), tier_label(tier)),
                                    cover_ref: Some(cover),
                                    ..base
                                }
                            }
                            Some(Ok(Err(err))) => {
                                tracing::warn!(file = %file.file_name, item_id = %item_id, error = %err, "cover link failed");
                                FileOutcome {
                                    status: FileStatus::Failed,
                                    detail: format!("link failed: {err}"),
                                    ..base
                                }
                            }
                            Some(Err(_elapsed)) => {
                                tracing::warn!(
                                    file = %file.file_name,
                                    item_id = %item_id,
                                    timeout_ms = self.config.per_file_timeout.as_millis() as u64,
                                    "cover link timed out"
                                );
                                let expected = self.expected_cover(item, file);
                                match self.stored_cover(item_id).await {
                                    // The write landed before the deadline fired.
                                    Some(stored) if stored == expected => {
                                        self.audit_link(item, file, &stored, request.actor_id);
                                        linked_in_batch.insert(item_id);
                                        FileOutcome {
                                            status: FileStatus::Linked,
                                            detail: format!(
                                                "linked to '{}' by {} (confirmed after a {} timeout)",
                                                item.title(),
                                                tier_label(tier),
                                                fmt_duration(self.config.per_file_timeout)
                                            ),
                                            cover_ref: Some(stored),
                                            ..base
                                        }
                                    }
                                    _ => FileOutcome {
                                        status: FileStatus::Failed,
                                        detail: format!(
                                            "timed out after {}; cover not linked",
                                            fmt_duration(self.config.per_file_timeout)
                                        ),
                                        ..base
                                    },
                                }
                            }
                        }
                    }
                }
            };

            tracing::debug!(file = %outcome.file_name, status = ?outcome.status, "file reconciled");
            summary.record(outcome);
        }

        tracing::info!(
            success = summary.success,
            skipped = summary.skipped,
            conflicts = summary.conflicts,
            unmatched = summary.unmatched,
            cancelled = summary.cancelled,
            "reconciliation finished"
        );
        Ok(summary)
    }

    /// All decodable items, keyed by id. Undecodable documents are logged and left out.
    async fn snapshot(&self) -> Result<HashMap<ItemId, InventoryItem>, StoreError> {
        let docs = scan_collection(self.store.as_ref(), &InventoryItem::collection_path(), &Query::all()).await?;

        let mut items = HashMap::with_capacity(docs.len());
        for doc in &docs {
            match codec::decode::<InventoryItem>(doc) {
                Ok(item) => {
                    items.insert(item.id(), item);
                }
                Err(err) => tracing::warn!(document_id = %doc.id, error = %err, "skipping undecodable item"),
            }
        }
        Ok(items)
    }

    fn audit_link(&self, item: &InventoryItem, file: &UploadedFile, cover: &BlobRef, actor_id: ActorId) {
        let mut action = AdminAction::new(
            actor_id,
            ActionKind::Update,
            INVENTORY_COLLECTION,
            item.id().to_string(),
            format!("cover linked from '{}'", file.file_name),
        )
        .with_new(json!({ "coverRef": cover }));
        if let Some(previous) = item.cover_ref() {
            action = action.with_previous(json!({ "coverRef": previous }));
        }
        self.audit.log_detached(action);
    }

    fn expected_cover(&self, item: &InventoryItem, file: &UploadedFile) -> BlobRef {
        BlobRef::new(cover_path(&self.config.cover_path_prefix, item.id(), &file.file_name))
    }

    /// Current `coverRef` of an item, read back from the store. Any read error
    /// counts as "not linked".
    async fn stored_cover(&self, item_id: ItemId) -> Option<BlobRef> {
        let stored = match self
            .store
            .get(&InventoryItem::collection_path(), &item_id.to_string())
            .await
        {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(item_id = %item_id, error = %err, "could not re-read item after timeout");
                return None;
            }
        };
        codec::decode::<InventoryItem>(&stored)
            .ok()
            .and_then(|item| item.cover_ref().cloned())
    }

    async fn link(&self, item: &InventoryItem, file: &UploadedFile, actor_id: ActorId) -> Result<BlobRef, LinkError> {
        let path = cover_path(&self.config.cover_path_prefix, item.id(), &file.file_name);
        let cover = self
            .blobs
            .upload(&path, &file.bytes, file.content_type.as_deref())
            .await?;

        let mut fields = JsonMap::new();
        fields.insert("coverRef".to_string(), json!(cover));
        fields.insert("updatedAt".to_string(), json!(Utc::now()));
        self.store
            .merge(&InventoryItem::collection_path(), &item.id().to_string(), fields)
            .await?;

        self.audit_link(item, file, &cover, actor_id);

        Ok(cover)
    }
}

fn tier_label(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::Isbn => "ISBN",
        MatchTier::Title => "title",
    }
}

fn fmt_duration(d: Duration) -> String {
    if d.as_millis() % 1000 == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_failures_as_unmatched() {
        let mut summary = ReconcileSummary::default();
        for status in [
            FileStatus::Linked,
            FileStatus::WouldLink,
            FileStatus::Skipped,
            FileStatus::Conflict,
            FileStatus::Unmatched,
            FileStatus::Failed,
        ] {
            summary.record(FileOutcome {
                file_name: "f.jpg".into(),
                normalized_key: "f".into(),
                status,
                item_id: None,
                tier: None,
                conflict_count: 0,
                cover_ref: None,
                detail: String::new(),
            });
        }
        assert_eq!(
            (summary.success, summary.skipped, summary.conflicts, summary.unmatched),
            (2, 1, 1, 2)
        );
        assert_eq!(summary.details.len(), 6);
    }

    #[test]
    fn statuses_serialize_in_camel_case() {
        assert_eq!(serde_json::to_value(FileStatus::WouldLink).unwrap(), json!("wouldLink"));
    }

    #[test]
    fn durations_render_compactly() {
        assert_eq!(fmt_duration(Duration::from_secs(30)), "30s");
        assert_eq!(fmt_duration(Duration::from_millis(250)), "250ms");
    }
}
