//! `shelfkeeper-auth`: identity adapter and authorization boundary.
//!
//! Turns a bearer token into the [`Actor`] performing a mutation and checks
//! role-derived permissions. Decoupled from HTTP and storage.

pub mod actor;
pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod roles;

pub use actor::Actor;
pub use authorize::{AuthzError, CommandAuthorization, authorize, permissions_for_roles};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use roles::Role;
