use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use shelfkeeper_infra::{
    AdminActionLog, AppConfig, Catalog, InMemoryBlobStore, InMemoryDocumentStore, Reconciler, StockLedger,
};
use shelfkeeper_inventory::ThresholdPolicy;

pub type Store = InMemoryDocumentStore;
pub type Blobs = InMemoryBlobStore;

/// Application services shared by all handlers.
pub struct AppServices {
    pub ledger: StockLedger<Store>,
    pub catalog: Catalog<Store>,
    pub reconciler: Reconciler<Store, Blobs>,
    pub audit: Arc<AdminActionLog<Store>>,
    pub blobs: Arc<Blobs>,
    /// Cancelled on shutdown; running reconciliation batches stop at the next file.
    pub shutdown: CancellationToken,
}

/// Wire in-memory adapters and the services built on them.
pub fn build_services(config: &AppConfig, shutdown: CancellationToken) -> AppServices {
    let store = Arc::new(InMemoryDocumentStore::new());
    let blobs = Arc::new(InMemoryBlobStore::new(config.blob_public_base_url.clone()));
    let audit = Arc::new(AdminActionLog::new(store.clone()));

    tracing::info!(
        low_stock_threshold = config.ledger.default_low_stock_threshold,
        max_attempts = config.ledger.retry.max_attempts,
        reconcile_timeout_secs = config.reconcile.per_file_timeout.as_secs(),
        "services wired with in-memory stores"
    );

    AppServices {
        ledger: StockLedger::new(
            store.clone(),
            audit.clone(),
            ThresholdPolicy::new(config.ledger.default_low_stock_threshold),
            config.ledger.retry.clone(),
        ),
        catalog: Catalog::new(store.clone(), audit.clone()),
        reconciler: Reconciler::new(store, blobs.clone(), audit.clone(), config.reconcile.clone()),
        audit,
        blobs,
        shutdown,
    }
}
