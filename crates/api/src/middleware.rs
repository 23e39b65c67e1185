use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use shelfkeeper_auth::{Actor, JwtValidator};

use crate::app::errors::json_error;
use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let unauthorized = |message: &str| json_error(StatusCode::UNAUTHORIZED, "unauthorized", message);

    let token = extract_bearer(req.headers()).ok_or_else(|| unauthorized("missing bearer token"))?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        unauthorized("invalid or expired token")
    })?;

    req.extensions_mut()
        .insert(ActorContext::new(Actor::from_claims(&claims)));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
