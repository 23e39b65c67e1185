//! API-side authorization guard.
//!
//! Permissions are checked at the request boundary, before any service is
//! invoked, keeping the ledger and reconciler auth-agnostic.

use axum::http::StatusCode;

use shelfkeeper_auth::{AuthzError, CommandAuthorization, Permission, authorize};

use crate::app::errors::json_error;
use crate::context::ActorContext;

/// Check every permission the operation requires.
pub fn authorize_command<C: CommandAuthorization>(actor: &ActorContext, command: &C) -> Result<(), AuthzError> {
    for perm in command.required_permissions() {
        authorize(actor.actor(), perm)?;
    }
    Ok(())
}

/// Single-permission guard returning a ready-made 403 response.
pub fn require(actor: &ActorContext, permission: &'static str) -> Result<(), axum::response::Response> {
    authorize(actor.actor(), &Permission::new(permission)).map_err(|e| {
        tracing::info!(actor_id = %actor.actor_id(), permission, "request forbidden");
        json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
    })
}
