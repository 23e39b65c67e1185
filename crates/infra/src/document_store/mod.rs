//! Document store abstraction + implementations.

pub mod codec;
pub mod in_memory;
pub mod query;
pub mod r#trait;
pub mod scan;
pub mod transaction;

pub use in_memory::InMemoryDocumentStore;
pub use query::{FieldFilter, MAX_QUERY_LIMIT, OrderBy, Query, SortDirection};
pub use r#trait::{CommitRequest, DocumentStore, DocumentWrite, ReadGuard, StoreError, StoredDocument};
pub use scan::scan_collection;
pub use transaction::Transaction;
