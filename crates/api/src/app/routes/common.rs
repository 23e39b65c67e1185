use shelfkeeper_auth::{CommandAuthorization, Permission};

/// Small helper wrapper to associate required permissions with an operation.
pub struct CmdAuth<C> {
    pub inner: C,
    pub required: Vec<Permission>,
}

impl<C> CmdAuth<C> {
    pub fn new(inner: C, required: &'static str) -> Self {
        Self {
            inner,
            required: vec![Permission::new(required)],
        }
    }
}

impl<C> CommandAuthorization for CmdAuth<C> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}

/// Clamp a client-supplied page size.
pub fn page_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).clamp(1, max)
}
