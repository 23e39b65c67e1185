//! Typed document schemas.
//!
//! Every record the engine persists is a plain Rust type implementing
//! [`Document`]. Store adapters only ever see JSON; the typed layer decides the
//! collection, the document id and the validation rules, so malformed payloads
//! are rejected at the adapter boundary instead of leaking into domain code.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DomainResult;

/// Slash-separated path to a collection (`inventory`, `inventory/{id}/stock_adjustments`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// A top-level collection.
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    /// A sub-collection nested under one document of this collection.
    pub fn sub(&self, document_id: &str, name: &str) -> Self {
        Self(format!("{}/{}/{}", self.0, document_id, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted, schema-tagged record.
pub trait Document: Serialize + DeserializeOwned {
    /// Schema tag written next to the payload and checked on every decode.
    const SCHEMA: &'static str;

    /// Collection the document lives in.
    fn collection(&self) -> CollectionPath;

    /// Document key inside its collection.
    fn document_id(&self) -> String;

    /// Structural checks beyond what serde enforces.
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }
}
