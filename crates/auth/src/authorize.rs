use thiserror::Error;

use crate::{Actor, Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Command-side authorization contract (checked at the command boundary).
///
/// The API layer enforces these requirements before invoking a service.
pub trait CommandAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Role → permission policy.
///
/// - `admin`: everything (`*`)
/// - `staff`: read inventory and make stock corrections
/// - `auditor`: read inventory and the audit log
pub fn permissions_for_roles(roles: &[Role]) -> Vec<Permission> {
    let mut perms = Vec::new();
    for role in roles {
        match role.as_str() {
            "admin" => return vec![Permission::new("*")],
            "staff" => {
                perms.push(Permission::new(Permission::INVENTORY_READ));
                perms.push(Permission::new(Permission::INVENTORY_ADJUST));
            }
            "auditor" => {
                perms.push(Permission::new(Permission::INVENTORY_READ));
                perms.push(Permission::new(Permission::AUDIT_READ));
            }
            _ => {}
        }
    }
    perms.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    perms.dedup();
    perms
}

/// Authorize an actor for one permission.
///
/// - No IO
/// - No panics
pub fn authorize(actor: &Actor, required: &Permission) -> Result<(), AuthzError> {
    let granted = actor.permissions();
    if granted
        .iter()
        .any(|p| p.is_wildcard() || p.as_str() == required.as_str())
    {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
