//! `shelfkeeper-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod document;
pub mod error;
pub mod id;
pub mod revision;

pub use document::{CollectionPath, Document};
pub use error::{DomainError, DomainResult};
pub use id::{ActorId, AuditRecordId, BlobRef, EntryId, ItemId};
pub use revision::ExpectedRevision;
