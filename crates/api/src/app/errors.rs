use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shelfkeeper_infra::{AuditLogError, CatalogError, LedgerError, ReconcileError, StoreError};

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::InvalidAdjustment(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        LedgerError::ItemNotFound(id) => json_error(StatusCode::NOT_FOUND, "not_found", format!("item {id} not found")),
        LedgerError::InsufficientStock { available, delta, .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": format!("only {available} in stock; adjustment of {delta} rejected"),
                "currentQuantity": available,
            })),
        )
            .into_response(),
        err @ LedgerError::TransactionConflict { .. } => json_error(StatusCode::CONFLICT, "conflict", err.to_string()),
        LedgerError::Store(e) => store_error_to_response(e),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::Invalid(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        CatalogError::Store(e) => store_error_to_response(e),
    }
}

pub fn audit_error_to_response(err: AuditLogError) -> axum::response::Response {
    match err {
        AuditLogError::Invalid(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuditLogError::Store(e) => store_error_to_response(e),
    }
}

pub fn reconcile_error_to_response(err: ReconcileError) -> axum::response::Response {
    match err {
        ReconcileError::Snapshot(e) => store_error_to_response(e),
    }
}

/// Infrastructure failures: full context goes to the log, a generic message to the caller.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    if let StoreError::Conflict { .. } = err {
        return json_error(StatusCode::CONFLICT, "conflict", "concurrent modification, retry the request");
    }
    tracing::error!(error = %err, "store operation failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
