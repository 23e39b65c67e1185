use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use shelfkeeper_core::{ActorId, AuditRecordId, CollectionPath, Document, DomainError, DomainResult};

/// Top-level collection holding admin audit records.
pub const ADMIN_AUDIT_COLLECTION: &str = "admin_audit_logs";

/// Kind of admin mutation being recorded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "CREATE",
            ActionKind::Update => "UPDATE",
            ActionKind::Delete => "DELETE",
        }
    }
}

impl core::str::FromStr for ActionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Ok(ActionKind::Create),
            "UPDATE" => Ok(ActionKind::Update),
            "DELETE" => Ok(ActionKind::Delete),
            other => Err(DomainError::validation(format!("unknown action kind '{other}'"))),
        }
    }
}

/// One admin mutation to be logged (input to the action logger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAction {
    pub actor_id: ActorId,
    pub action_kind: ActionKind,
    pub collection_name: String,
    pub document_id: String,
    pub details: String,
    pub previous_data: Option<JsonValue>,
    pub new_data: Option<JsonValue>,
}

impl AdminAction {
    pub fn new(
        actor_id: ActorId,
        action_kind: ActionKind,
        collection_name: impl Into<String>,
        document_id: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            actor_id,
            action_kind,
            collection_name: collection_name.into(),
            document_id: document_id.into(),
            details: details.into(),
            previous_data: None,
            new_data: None,
        }
    }

    pub fn with_previous(mut self, data: JsonValue) -> Self {
        self.previous_data = Some(data);
        self
    }

    pub fn with_new(mut self, data: JsonValue) -> Self {
        self.new_data = Some(data);
        self
    }

    /// Stamp the action into an immutable record.
    pub fn into_record(self, id: AuditRecordId, at: DateTime<Utc>) -> AdminAuditRecord {
        AdminAuditRecord {
            id,
            action_kind: self.action_kind,
            collection_name: self.collection_name,
            document_id: self.document_id,
            details: self.details,
            previous_data: self.previous_data,
            new_data: self.new_data,
            actor_id: self.actor_id,
            timestamp: at,
        }
    }
}

/// Immutable audit record of an admin mutation anywhere in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuditRecord {
    pub id: AuditRecordId,
    pub action_kind: ActionKind,
    pub collection_name: String,
    pub document_id: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_data: Option<JsonValue>,
    pub actor_id: ActorId,
    pub timestamp: DateTime<Utc>,
}

impl AdminAuditRecord {
    pub fn collection_path() -> CollectionPath {
        CollectionPath::root(ADMIN_AUDIT_COLLECTION)
    }
}

impl Document for AdminAuditRecord {
    const SCHEMA: &'static str = "admin_audit_record";

    fn collection(&self) -> CollectionPath {
        Self::collection_path()
    }

    fn document_id(&self) -> String {
        self.id.to_string()
    }

    fn validate(&self) -> DomainResult<()> {
        if self.collection_name.trim().is_empty() {
            return Err(DomainError::schema("audit record without collection name"));
        }
        if self.document_id.trim().is_empty() {
            return Err(DomainError::schema("audit record without document id"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_kind_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_value(ActionKind::Delete).unwrap(), serde_json::json!("DELETE"));
        assert_eq!("update".parse::<ActionKind>().unwrap(), ActionKind::Update);
        assert!("archive".parse::<ActionKind>().is_err());
    }

    #[test]
    fn record_carries_action_payloads() {
        let actor = ActorId::new();
        let record = AdminAction::new(actor, ActionKind::Update, "orders", "o-1", "status packed")
            .with_previous(serde_json::json!({"status": "pending"}))
            .with_new(serde_json::json!({"status": "packed"}))
            .into_record(AuditRecordId::new(), Utc::now());

        assert_eq!(record.actor_id, actor);
        assert_eq!(record.previous_data.unwrap()["status"], "pending");
        assert_eq!(record.new_data.unwrap()["status"], "packed");
    }

    #[test]
    fn blank_document_id_fails_validation() {
        let record = AdminAction::new(ActorId::new(), ActionKind::Create, "inventory", " ", "x")
            .into_record(AuditRecordId::new(), Utc::now());
        assert!(record.validate().is_err());
    }
}
