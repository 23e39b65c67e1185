use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

pub mod admin;
pub mod common;
pub mod inventory;
pub mod reconcile;
pub mod system;

/// Base64 inflates payloads by a third; leave room for a batch of covers.
const RECONCILE_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/adjust", post(inventory::adjust_stock))
        .route(
            "/reconcile",
            post(reconcile::reconcile).layer(DefaultBodyLimit::max(RECONCILE_BODY_LIMIT)),
        )
        .nest("/inventory", inventory::router())
        .nest("/admin", admin::router())
}
