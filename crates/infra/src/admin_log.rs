//! Admin action logger.
//!
//! Every admin mutation in the system appends one [`AdminAuditRecord`]. The
//! logger is best-effort from the caller's point of view: a failed append is
//! reported through `tracing` and never propagates into the mutation that
//! triggered it.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use shelfkeeper_audit::{ActionKind, AdminAction, AdminAuditRecord};
use shelfkeeper_core::AuditRecordId;

use crate::document_store::{DocumentStore, Query, SortDirection, StoreError, Transaction, codec};

#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("invalid audit action: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Optional filters for [`AdminActionLog::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub collection_name: Option<String>,
    pub document_id: Option<String>,
    pub action_kind: Option<ActionKind>,
}

#[derive(Debug)]
pub struct AdminActionLog<S> {
    store: Arc<S>,
}

impl<S> AdminActionLog<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Append one record, surfacing failures.
    pub async fn log_action(&self, action: AdminAction) -> Result<AdminAuditRecord, AuditLogError> {
        if action.collection_name.trim().is_empty() || action.document_id.trim().is_empty() {
            return Err(AuditLogError::Invalid(
                "collection name and document id are required".to_string(),
            ));
        }

        let record = action.into_record(AuditRecordId::new(), Utc::now());
        let mut tx = Transaction::begin(self.store.as_ref());
        tx.create(&record)?;
        tx.commit().await?;

        tracing::debug!(
            audit_id = %record.id,
            action = record.action_kind.as_str(),
            collection = %record.collection_name,
            document_id = %record.document_id,
            "admin action recorded"
        );
        Ok(record)
    }

    /// Append one record; failures are logged and swallowed.
    pub async fn log_best_effort(&self, action: AdminAction) -> Option<AdminAuditRecord> {
        let collection = action.collection_name.clone();
        let document_id = action.document_id.clone();
        match self.log_action(action).await {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(
                    path = %AdminAuditRecord::collection_path(),
                    target_collection = %collection,
                    document_id = %document_id,
                    error = %err,
                    "failed to write admin audit record"
                );
                None
            }
        }
    }

    /// Fire-and-forget: schedule the append and return immediately.
    pub fn log_detached(self: &Arc<Self>, action: AdminAction) -> tokio::task::JoinHandle<Option<AdminAuditRecord>> {
        let log = Arc::clone(self);
        tokio::spawn(async move { log.log_best_effort(action).await })
    }

    /// Records matching `filter`, newest first.
    pub async fn list(&self, filter: &AuditFilter, limit: usize) -> Result<Vec<AdminAuditRecord>, AuditLogError> {
        let mut query = Query::all()
            .order_by("timestamp", SortDirection::Descending)
            .limit(limit);
        if let Some(collection) = &filter.collection_name {
            query = query.filter_eq("collectionName", collection.as_str());
        }
        if let Some(document_id) = &filter.document_id {
            query = query.filter_eq("documentId", document_id.as_str());
        }
        if let Some(kind) = filter.action_kind {
            query = query.filter_eq("actionKind", kind.as_str());
        }

        let docs = self.store.query(&AdminAuditRecord::collection_path(), &query).await?;
        docs.iter()
            .map(|d| codec::decode::<AdminAuditRecord>(d).map_err(AuditLogError::from))
            .collect()
    }
}
