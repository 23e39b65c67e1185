//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: adapter wiring (document store, blob store, ledger, reconciler)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;

use shelfkeeper_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Development-only signing secret used when `JWT_SECRET` is unset.
pub const DEV_JWT_SECRET: &str = "dev-secret";

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig, shutdown: CancellationToken) -> Router {
    let secret = config
        .jwt_secret
        .clone()
        .unwrap_or_else(|| DEV_JWT_SECRET.to_string());
    let jwt = Arc::new(shelfkeeper_auth::Hs256JwtValidator::new(secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::build_services(config, shutdown));

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
