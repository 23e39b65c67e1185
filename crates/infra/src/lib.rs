//! Infrastructure layer: document/blob storage, ledger and reconciliation services, config.

pub mod admin_log;
pub mod blob_store;
pub mod catalog;
pub mod config;
pub mod document_store;
pub mod ledger;
pub mod reconcile;
pub mod retry;

mod integration_tests;

pub use admin_log::{AdminActionLog, AuditFilter, AuditLogError};
pub use blob_store::{BlobError, BlobStore, InMemoryBlobStore};
pub use catalog::{Catalog, CatalogError};
pub use config::{AppConfig, ConfigError, LedgerConfig, ReconcileConfig};
pub use document_store::{DocumentStore, InMemoryDocumentStore, StoreError};
pub use ledger::{AdjustmentOutcome, LedgerError, StockLedger};
pub use reconcile::{FileOutcome, FileStatus, ReconcileError, ReconcileRequest, ReconcileSummary, Reconciler, UploadedFile};
pub use retry::RetryPolicy;
