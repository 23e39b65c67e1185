use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as JsonValue};
use thiserror::Error;

use shelfkeeper_core::{CollectionPath, ExpectedRevision};

use super::query::Query;

/// A document as persisted: raw JSON plus its store-assigned revision.
///
/// Revisions start at 1 when a document is created and grow by one with every
/// committed write. They are the basis of optimistic concurrency.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub collection: CollectionPath,
    pub id: String,
    pub revision: u64,
    pub data: JsonValue,
}

/// A revision observed during a transaction's read phase.
///
/// The commit is rejected if the document moved on (or appeared/disappeared)
/// since it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadGuard {
    pub collection: CollectionPath,
    pub id: String,
    pub expected: ExpectedRevision,
}

/// One buffered write of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub collection: CollectionPath,
    pub id: String,
    pub data: JsonValue,
    pub expected: ExpectedRevision,
}

/// Everything a transaction wants to commit atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitRequest {
    pub reads: Vec<ReadGuard>,
    pub writes: Vec<DocumentWrite>,
}

/// Document store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Another writer committed first; the transaction can be re-run.
    #[error("write conflict on {collection}/{id}: {detail}")]
    Conflict {
        collection: String,
        id: String,
        detail: String,
    },

    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Persisted data does not decode into (or validate as) its declared schema.
    #[error("schema violation in {collection}/{id}: {detail}")]
    Schema {
        collection: String,
        id: String,
        detail: String,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The backend could not be reached or is in a broken state.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn conflict(collection: &CollectionPath, id: &str, detail: impl Into<String>) -> Self {
        Self::Conflict {
            collection: collection.to_string(),
            id: id.to_string(),
            detail: detail.into(),
        }
    }

    pub fn not_found(collection: &CollectionPath, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn schema(collection: &CollectionPath, id: &str, detail: impl Into<String>) -> Self {
        Self::Schema {
            collection: collection.to_string(),
            id: id.to_string(),
            detail: detail.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Durable, strongly-consistent document database.
///
/// ## Design Principles
///
/// - **No storage assumptions**: payloads are plain JSON; schemas live in the
///   typed layer (`codec`), so in-memory and networked backends are interchangeable
/// - **Optimistic locking**: transactions carry the revisions they read and the
///   backend rejects the commit with [`StoreError::Conflict`] if any moved on
/// - **Atomic commits**: all writes of a [`CommitRequest`] land or none do
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - validate every read guard and write expectation before applying any write
/// - bump the revision of every written document by exactly one
/// - keep `merge` a single-document operation that never touches unnamed fields
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Fetch documents of one collection matching `query`.
    async fn query(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Overwrite the named top-level fields of an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn merge(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: JsonMap<String, JsonValue>,
    ) -> Result<StoredDocument, StoreError>;

    /// Atomically validate `request.reads` and apply `request.writes`.
    async fn commit(&self, request: CommitRequest) -> Result<Vec<StoredDocument>, StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).query(collection, query).await
    }

    async fn merge(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: JsonMap<String, JsonValue>,
    ) -> Result<StoredDocument, StoreError> {
        (**self).merge(collection, id, fields).await
    }

    async fn commit(&self, request: CommitRequest) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).commit(request).await
    }
}
