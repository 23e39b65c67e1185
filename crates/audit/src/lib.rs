//! Admin audit domain module.
//!
//! Cross-cutting, append-only record of every admin mutation. Independent of
//! the stock ledger; storage lives in `shelfkeeper-infra`.

pub mod record;

pub use record::{ADMIN_AUDIT_COLLECTION, ActionKind, AdminAction, AdminAuditRecord};
