//! Binary object storage for cover images.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use shelfkeeper_core::{BlobRef, ItemId};

/// Largest object accepted by [`BlobStore::upload`] (5MB).
pub const MAX_BLOB_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlobError {
    #[error("upload to {path} failed: {reason}")]
    Upload { path: String, reason: String },

    #[error("blob {0} not found")]
    NotFound(String),
}

/// Upload bytes, get back a stable reference.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<BlobRef, BlobError>;

    /// Public URL a client can fetch the object from.
    fn download_url(&self, blob: &BlobRef) -> String;
}

#[async_trait::async_trait]
impl<B> BlobStore for std::sync::Arc<B>
where
    B: BlobStore + ?Sized,
{
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<BlobRef, BlobError> {
        (**self).upload(path, bytes, content_type).await
    }

    fn download_url(&self, blob: &BlobRef) -> String {
        (**self).download_url(blob)
    }
}

/// Storage path for a cover image: `{prefix}/{item_id}/{file_name}`.
///
/// Characters outside `[A-Za-z0-9._-]` in the file name become `_`.
pub fn cover_path(prefix: &str, item_id: ItemId, file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = if sanitized.is_empty() { "cover".to_string() } else { sanitized };
    format!("{}/{item_id}/{name}", prefix.trim_end_matches('/'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// In-memory blob store (tests/dev).
#[derive(Debug)]
pub struct InMemoryBlobStore {
    public_base_url: String,
    objects: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, blob: &BlobRef) -> Result<StoredBlob, BlobError> {
        let objects = self
            .objects
            .read()
            .map_err(|_| BlobError::NotFound("lock poisoned".to_string()))?;
        objects
            .get(blob.as_str())
            .cloned()
            .ok_or_else(|| BlobError::NotFound(blob.to_string()))
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<BlobRef, BlobError> {
        let fail = |reason: &str| BlobError::Upload {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.trim().is_empty() {
            return Err(fail("empty path"));
        }
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(fail("object exceeds maximum size"));
        }

        let mut objects = self.objects.write().map_err(|_| fail("lock poisoned"))?;
        objects.insert(
            path.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(BlobRef::new(path))
    }

    fn download_url(&self, blob: &BlobRef) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), blob.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_path_sanitizes_the_file_name() {
        let id = ItemId::new();
        assert_eq!(
            cover_path("covers/", id, "uploads\\My Book!.jpg"),
            format!("covers/{id}/My_Book_.jpg")
        );
    }

    #[tokio::test]
    async fn upload_then_fetch() {
        let store = InMemoryBlobStore::new("https://cdn.example.test/");
        let blob = store.upload("covers/a/x.png", b"png", Some("image/png")).await.unwrap();

        assert_eq!(store.get(&blob).unwrap().content_type.as_deref(), Some("image/png"));
        assert_eq!(store.download_url(&blob), "https://cdn.example.test/covers/a/x.png");
    }

    #[tokio::test]
    async fn oversized_uploads_are_rejected() {
        let store = InMemoryBlobStore::default();
        let big = vec![0u8; MAX_BLOB_SIZE + 1];
        let err = store.upload("covers/a/big.jpg", &big, None).await.unwrap_err();
        assert!(matches!(err, BlobError::Upload { .. }));
        assert!(store.is_empty());
    }
}
