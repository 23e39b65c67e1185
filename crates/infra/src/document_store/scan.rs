//! Whole-collection reads.
//!
//! A single [`Query`] never returns more than [`MAX_QUERY_LIMIT`] rows. Callers
//! that need every document (batch snapshots, full listings) page through the
//! collection by document id instead.

use shelfkeeper_core::CollectionPath;

use super::query::{MAX_QUERY_LIMIT, Query};
use super::r#trait::{DocumentStore, StoreError, StoredDocument};

/// Every document of `collection` that passes the filters of `filter`, in id order.
///
/// `filter` may carry equality filters only; ordering, limit and cursor are
/// owned by the scan.
pub async fn scan_collection<S>(
    store: &S,
    collection: &CollectionPath,
    filter: &Query,
) -> Result<Vec<StoredDocument>, StoreError>
where
    S: DocumentStore + ?Sized,
{
    if filter.order_by.is_some() || filter.limit.is_some() || filter.after_id.is_some() {
        return Err(StoreError::InvalidQuery(
            "collection scans accept filters only".to_string(),
        ));
    }

    let mut out = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let mut page_query = filter.clone().limit(MAX_QUERY_LIMIT);
        if let Some(after) = cursor.take() {
            page_query = page_query.after_id(after);
        }

        let page = store.query(collection, &page_query).await?;
        let full_page = page.len() == MAX_QUERY_LIMIT;
        cursor = page.last().map(|d| d.id.clone());
        out.extend(page);

        if !full_page {
            break;
        }
    }

    tracing::trace!(collection = %collection, documents = out.len(), "collection scanned");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::{CommitRequest, DocumentWrite, InMemoryDocumentStore, SortDirection};
    use serde_json::json;
    use shelfkeeper_core::ExpectedRevision;

    async fn seed(store: &InMemoryDocumentStore, collection: &CollectionPath, count: usize) {
        let writes = (0..count)
            .map(|i| DocumentWrite {
                collection: collection.clone(),
                id: format!("doc-{i:05}"),
                data: json!({ "n": i, "even": i % 2 == 0 }),
                expected: ExpectedRevision::Missing,
            })
            .collect();
        store
            .commit(CommitRequest {
                reads: Vec::new(),
                writes,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn scans_past_the_per_query_cap() {
        let store = InMemoryDocumentStore::new();
        let things = CollectionPath::root("things");
        seed(&store, &things, MAX_QUERY_LIMIT * 2 + 7).await;

        let capped = store.query(&things, &Query::all()).await.unwrap();
        assert_eq!(capped.len(), MAX_QUERY_LIMIT);

        let all = scan_collection(&store, &things, &Query::all()).await.unwrap();
        assert_eq!(all.len(), MAX_QUERY_LIMIT * 2 + 7);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn exact_multiple_of_the_page_size_terminates() {
        let store = InMemoryDocumentStore::new();
        let things = CollectionPath::root("things");
        seed(&store, &things, MAX_QUERY_LIMIT).await;

        let all = scan_collection(&store, &things, &Query::all()).await.unwrap();
        assert_eq!(all.len(), MAX_QUERY_LIMIT);
    }

    #[tokio::test]
    async fn filters_apply_across_pages() {
        let store = InMemoryDocumentStore::new();
        let things = CollectionPath::root("things");
        seed(&store, &things, 2500).await;

        let evens = scan_collection(&store, &things, &Query::all().filter_eq("even", true))
            .await
            .unwrap();
        assert_eq!(evens.len(), 1250);
    }

    #[tokio::test]
    async fn ordering_and_limits_are_rejected() {
        let store = InMemoryDocumentStore::new();
        let things = CollectionPath::root("things");

        let err = scan_collection(&store, &things, &Query::all().order_by("n", SortDirection::Ascending))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
        let err = scan_collection(&store, &things, &Query::all().limit(5)).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
    }
}
