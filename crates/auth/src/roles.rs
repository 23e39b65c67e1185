use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role carried in a token (`admin`, `staff`, `auditor`, ...).
///
/// Unknown roles are kept as-is and simply grant nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn admin() -> Self {
        Self::new("admin")
    }

    pub fn staff() -> Self {
        Self::new("staff")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
