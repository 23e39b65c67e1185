use shelfkeeper_auth::{Actor, Permission, Role};
use shelfkeeper_core::ActorId;

/// Authenticated actor for a request.
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor.id
    }

    pub fn display_name(&self) -> &str {
        &self.actor.display_name
    }

    pub fn roles(&self) -> &[Role] {
        &self.actor.roles
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.actor.permissions()
    }
}
