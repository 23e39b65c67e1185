//! Typed <-> JSON conversion at the store boundary.
//!
//! Every persisted payload carries a `_schema` tag naming its [`Document`]
//! type. Decoding checks the tag, deserializes and re-runs validation, so a
//! document written by a different schema (or edited by hand) surfaces as
//! [`StoreError::Schema`] instead of a half-valid domain value.

use serde_json::Value as JsonValue;

use shelfkeeper_core::Document;

use super::r#trait::{StoreError, StoredDocument};

pub const SCHEMA_FIELD: &str = "_schema";

pub fn encode<D: Document>(doc: &D) -> Result<JsonValue, StoreError> {
    let collection = doc.collection();
    let id = doc.document_id();

    doc.validate()
        .map_err(|e| StoreError::schema(&collection, &id, e.to_string()))?;

    let mut value =
        serde_json::to_value(doc).map_err(|e| StoreError::schema(&collection, &id, e.to_string()))?;
    let JsonValue::Object(map) = &mut value else {
        return Err(StoreError::schema(&collection, &id, "document must serialize to an object"));
    };
    map.insert(SCHEMA_FIELD.to_string(), JsonValue::String(D::SCHEMA.to_string()));

    Ok(value)
}

pub fn decode<D: Document>(stored: &StoredDocument) -> Result<D, StoreError> {
    let fail = |detail: String| StoreError::schema(&stored.collection, &stored.id, detail);

    let JsonValue::Object(map) = &stored.data else {
        return Err(fail("stored payload is not an object".to_string()));
    };
    match map.get(SCHEMA_FIELD).and_then(JsonValue::as_str) {
        Some(tag) if tag == D::SCHEMA => {}
        Some(tag) => return Err(fail(format!("expected schema '{}', found '{tag}'", D::SCHEMA))),
        None => return Err(fail(format!("missing {SCHEMA_FIELD} tag"))),
    }

    let mut payload = map.clone();
    payload.remove(SCHEMA_FIELD);
    let doc: D = serde_json::from_value(JsonValue::Object(payload)).map_err(|e| fail(e.to_string()))?;
    doc.validate().map_err(|e| fail(e.to_string()))?;

    Ok(doc)
}
