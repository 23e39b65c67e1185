use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use shelfkeeper_auth::Permission;
use shelfkeeper_infra::ReconcileRequest;

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

/// `POST /reconcile`
///
/// Per-file outcomes (conflicts, misses, failed uploads) are part of the 200
/// summary; only a failed inventory snapshot is an error.
pub async fn reconcile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::ReconcileRequest>,
) -> axum::response::Response {
    let cmd_auth = CmdAuth::new(body, Permission::INVENTORY_RECONCILE);
    if let Err(e) = crate::authz::authorize_command(&actor, &cmd_auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let body = cmd_auth.inner;

    let files = match body
        .files
        .into_iter()
        .map(dto::UploadFileRequest::decode)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(files) => files,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
    };

    let request = ReconcileRequest {
        files,
        overwrite: body.overwrite,
        dry_run: body.dry_run,
        actor_id: actor.actor_id(),
    };

    let cancel = services.shutdown.child_token();
    match services.reconciler.reconcile(request, &cancel).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
