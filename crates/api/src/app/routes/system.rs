use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(actor): Extension<ActorContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "actorId": actor.actor_id().to_string(),
        "displayName": actor.display_name(),
        "roles": actor.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": actor.permissions().iter().map(|p| p.as_str().to_string()).collect::<Vec<_>>(),
    }))
}
