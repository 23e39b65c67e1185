use shelfkeeper_core::{CollectionPath, Document, ExpectedRevision};

use super::codec;
use super::r#trait::{CommitRequest, DocumentStore, DocumentWrite, ReadGuard, StoreError, StoredDocument};

/// Read-then-write unit of work over a [`DocumentStore`].
///
/// Every read records the revision it observed; writes are buffered and sent
/// with those observations in one [`CommitRequest`]. If anything read has
/// changed by commit time, the store rejects the commit and nothing is written.
pub struct Transaction<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    reads: Vec<ReadGuard>,
    writes: Vec<DocumentWrite>,
}

impl<'a, S: DocumentStore + ?Sized> Transaction<'a, S> {
    pub fn begin(store: &'a S) -> Self {
        Self {
            store,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Read and decode one document, recording its revision in the read set.
    pub async fn get<D: Document>(
        &mut self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<D>, StoreError> {
        let stored: Option<StoredDocument> = self.store.get(collection, id).await?;
        self.reads.push(ReadGuard {
            collection: collection.clone(),
            id: id.to_string(),
            expected: ExpectedRevision::observed(stored.as_ref().map(|d| d.revision)),
        });
        stored.as_ref().map(codec::decode::<D>).transpose()
    }

    /// Buffer a full overwrite of `doc`.
    pub fn set<D: Document>(&mut self, doc: &D) -> Result<(), StoreError> {
        self.push(doc, ExpectedRevision::Any)
    }

    /// Buffer the creation of `doc`; the commit fails if the id already exists.
    pub fn create<D: Document>(&mut self, doc: &D) -> Result<(), StoreError> {
        self.push(doc, ExpectedRevision::Missing)
    }

    fn push<D: Document>(&mut self, doc: &D, expected: ExpectedRevision) -> Result<(), StoreError> {
        let data = codec::encode(doc)?;
        self.writes.push(DocumentWrite {
            collection: doc.collection(),
            id: doc.document_id(),
            data,
            expected,
        });
        Ok(())
    }

    pub async fn commit(self) -> Result<Vec<StoredDocument>, StoreError> {
        if self.writes.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .commit(CommitRequest {
                reads: self.reads,
                writes: self.writes,
            })
            .await
    }
}
