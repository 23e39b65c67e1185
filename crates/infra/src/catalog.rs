//! Item registration.
//!
//! New items always start with zero stock; quantity only moves through the
//! [`StockLedger`](crate::ledger::StockLedger).

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use shelfkeeper_audit::{ActionKind, AdminAction};
use shelfkeeper_core::{ActorId, DomainError, ItemId};
use shelfkeeper_inventory::{INVENTORY_COLLECTION, InventoryItem, NewItem};

use crate::admin_log::AdminActionLog;
use crate::document_store::{DocumentStore, StoreError, Transaction};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid item: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for CatalogError {
    fn from(value: DomainError) -> Self {
        CatalogError::Invalid(value.to_string())
    }
}

pub struct Catalog<S> {
    store: Arc<S>,
    audit: Arc<AdminActionLog<S>>,
}

impl<S> Catalog<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>, audit: Arc<AdminActionLog<S>>) -> Self {
        Self { store, audit }
    }

    #[instrument(skip(self, input), fields(actor_id = %actor_id), err)]
    pub async fn create_item(&self, input: NewItem, actor_id: ActorId) -> Result<InventoryItem, CatalogError> {
        let item = InventoryItem::create(ItemId::new(), input, Utc::now())?;

        let mut tx = Transaction::begin(self.store.as_ref());
        tx.create(&item)?;
        tx.commit().await?;

        tracing::info!(item_id = %item.id(), title = item.title(), "item registered");

        let snapshot = serde_json::to_value(&item).ok();
        let mut action = AdminAction::new(
            actor_id,
            ActionKind::Create,
            INVENTORY_COLLECTION,
            item.id().to_string(),
            format!("registered item '{}'", item.title()),
        );
        if let Some(data) = snapshot {
            action = action.with_new(data);
        }
        self.audit.log_detached(action);

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_log::AuditFilter;
    use crate::document_store::InMemoryDocumentStore;

    #[tokio::test]
    async fn created_items_start_empty_and_are_audited() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let audit = Arc::new(AdminActionLog::new(store.clone()));
        let catalog = Catalog::new(store.clone(), audit.clone());

        let item = catalog
            .create_item(
                NewItem {
                    title: "  Mahabharata ".to_string(),
                    isbn: Some("9780140446814".to_string()),
                    low_stock_threshold_override: Some(2),
                },
                ActorId::new(),
            )
            .await
            .unwrap();
        assert_eq!(item.quantity(), 0);
        assert_eq!(item.title(), "Mahabharata");

        // The audit write is detached; give it a moment to land.
        for _ in 0..50 {
            if !audit.list(&AuditFilter::default(), 10).await.unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let records = audit.list(&AuditFilter::default(), 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action_kind, ActionKind::Create);
        assert_eq!(records[0].document_id, item.id().to_string());
    }

    #[tokio::test]
    async fn blank_titles_are_rejected() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let catalog = Catalog::new(store.clone(), Arc::new(AdminActionLog::new(store)));

        let err = catalog
            .create_item(
                NewItem {
                    title: " ".to_string(),
                    isbn: None,
                    low_stock_threshold_override: None,
                },
                ActorId::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }
}
