use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier (e.g. `"inventory.adjust"`).
///
/// The wildcard `"*"` grants every permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const INVENTORY_READ: &'static str = "inventory.read";
    pub const INVENTORY_ADJUST: &'static str = "inventory.adjust";
    pub const INVENTORY_RECONCILE: &'static str = "inventory.reconcile";
    pub const INVENTORY_ITEMS_CREATE: &'static str = "inventory.items.create";
    pub const AUDIT_READ: &'static str = "audit.read";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
