use serde::{Deserialize, Serialize};

use shelfkeeper_core::ActorId;

use crate::{JwtClaims, Permission, Role, permissions_for_roles};

/// The authenticated identity behind a request (`CurrentActor()`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub display_name: String,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(id: ActorId, display_name: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            roles,
        }
    }

    /// Build the actor from verified claims. Falls back to the id as display name.
    pub fn from_claims(claims: &JwtClaims) -> Self {
        let display_name = claims
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| claims.sub.to_string());
        Self::new(claims.sub, display_name, claims.roles.clone())
    }

    /// Effective permissions granted by the actor's roles.
    pub fn permissions(&self) -> Vec<Permission> {
        permissions_for_roles(&self.roles)
    }
}
