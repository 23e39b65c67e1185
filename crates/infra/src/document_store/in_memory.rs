use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::{Map as JsonMap, Value as JsonValue};

use shelfkeeper_core::{CollectionPath, ExpectedRevision};

use super::query::Query;
use super::r#trait::{CommitRequest, DocumentStore, StoreError, StoredDocument};

type Collection = BTreeMap<String, StoredDocument>;

/// In-memory document store with revision-checked commits.
///
/// Intended for tests/dev. A single write lock serializes commits, which is
/// what makes read-set validation and write application atomic.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<CollectionPath, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }

    fn revision_of(
        collections: &HashMap<CollectionPath, Collection>,
        collection: &CollectionPath,
        id: &str,
    ) -> Option<u64> {
        collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|d| d.revision)
    }

    fn check(
        collections: &HashMap<CollectionPath, Collection>,
        collection: &CollectionPath,
        id: &str,
        expected: &ExpectedRevision,
    ) -> Result<(), StoreError> {
        let current = Self::revision_of(collections, collection, id);
        if expected.matches(current) {
            Ok(())
        } else {
            Err(StoreError::conflict(
                collection,
                id,
                format!("expected {expected:?}, found {current:?}"),
            ))
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn query(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let docs: Vec<StoredDocument> = {
            let collections = self.collections.read().map_err(|_| Self::poisoned())?;
            collections
                .get(collection)
                .map(|docs| docs.values().cloned().collect())
                .unwrap_or_default()
        };
        Ok(query.apply(docs))
    }

    async fn merge(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: JsonMap<String, JsonValue>,
    ) -> Result<StoredDocument, StoreError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        let JsonValue::Object(data) = &mut doc.data else {
            return Err(StoreError::schema(collection, id, "stored document is not an object"));
        };
        for (key, value) in fields {
            data.insert(key, value);
        }
        doc.revision += 1;

        Ok(doc.clone())
    }

    async fn commit(&self, request: CommitRequest) -> Result<Vec<StoredDocument>, StoreError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;

        // Validate everything first; nothing is applied unless all checks pass.
        for read in &request.reads {
            Self::check(&collections, &read.collection, &read.id, &read.expected)?;
        }
        for write in &request.writes {
            Self::check(&collections, &write.collection, &write.id, &write.expected)?;
        }

        let mut committed = Vec::with_capacity(request.writes.len());
        for write in request.writes {
            let docs = collections.entry(write.collection.clone()).or_default();
            let revision = docs.get(&write.id).map(|d| d.revision).unwrap_or(0) + 1;
            let stored = StoredDocument {
                collection: write.collection,
                id: write.id.clone(),
                revision,
                data: write.data,
            };
            docs.insert(write.id, stored.clone());
            committed.push(stored);
        }

        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::{DocumentWrite, ReadGuard};
    use serde_json::json;

    fn things() -> CollectionPath {
        CollectionPath::root("things")
    }

    fn write(id: &str, data: JsonValue, expected: ExpectedRevision) -> DocumentWrite {
        DocumentWrite {
            collection: things(),
            id: id.to_string(),
            data,
            expected,
        }
    }

    #[tokio::test]
    async fn commit_assigns_increasing_revisions() {
        let store = InMemoryDocumentStore::new();
        let first = store
            .commit(CommitRequest {
                reads: vec![],
                writes: vec![write("a", json!({"n": 1}), ExpectedRevision::Missing)],
            })
            .await
            .unwrap();
        assert_eq!(first[0].revision, 1);

        let second = store
            .commit(CommitRequest {
                reads: vec![],
                writes: vec![write("a", json!({"n": 2}), ExpectedRevision::Exact(1))],
            })
            .await
            .unwrap();
        assert_eq!(second[0].revision, 2);
        assert_eq!(store.get(&things(), "a").await.unwrap().unwrap().data, json!({"n": 2}));
    }

    #[tokio::test]
    async fn stale_read_rejects_the_whole_commit() {
        let store = InMemoryDocumentStore::new();
        store
            .commit(CommitRequest {
                reads: vec![],
                writes: vec![write("a", json!({"n": 1}), ExpectedRevision::Missing)],
            })
            .await
            .unwrap();

        let err = store
            .commit(CommitRequest {
                reads: vec![ReadGuard {
                    collection: things(),
                    id: "a".to_string(),
                    expected: ExpectedRevision::Missing,
                }],
                writes: vec![write("b", json!({"n": 9}), ExpectedRevision::Any)],
            })
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert!(store.get(&things(), "b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_requires_an_existing_document() {
        let store = InMemoryDocumentStore::new();
        let mut fields = JsonMap::new();
        fields.insert("coverRef".to_string(), json!("covers/x.jpg"));

        let err = store.merge(&things(), "nope", fields.clone()).await.unwrap_err();
        assert_eq!(err, StoreError::not_found(&things(), "nope"));

        store
            .commit(CommitRequest {
                reads: vec![],
                writes: vec![write("a", json!({"n": 1}), ExpectedRevision::Missing)],
            })
            .await
            .unwrap();
        let merged = store.merge(&things(), "a", fields).await.unwrap();
        assert_eq!(merged.data, json!({"n": 1, "coverRef": "covers/x.jpg"}));
        assert_eq!(merged.revision, 2);
    }
}
