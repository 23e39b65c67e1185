use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use shelfkeeper_audit::ActionKind;
use shelfkeeper_auth::Permission;
use shelfkeeper_infra::AuditFilter;

use crate::app::routes::common::page_limit;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/audit", get(list_audit_records))
}

/// `GET /admin/audit?collection=&documentId=&action=&limit=`, newest first.
pub async fn list_audit_records(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<dto::AuditQuery>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require(&actor, Permission::AUDIT_READ) {
        return resp;
    }

    let action_kind = match query.action.as_deref().map(str::parse::<ActionKind>).transpose() {
        Ok(kind) => kind,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
    };

    let filter = AuditFilter {
        collection_name: query.collection,
        document_id: query.document_id,
        action_kind,
    };

    match services.audit.list(&filter, page_limit(query.limit, 100, 1000)).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => errors::audit_error_to_response(e),
    }
}
