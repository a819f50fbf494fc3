//! Tenant credentials

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant identity attached to every tenant-scoped request
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Tenant (`empresa`)
    pub tenant_id: String,
    /// User (`usuario`), may be empty
    pub user_id: String,
    /// Access token (`token`)
    pub access_token: String,
    /// Runtime base URL override (hosted vs local network)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Credentials {
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            access_token: access_token.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Tenant and token are both present
    pub fn is_authenticated(&self) -> bool {
        !self.tenant_id.is_empty() && !self.access_token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("user_id", &self.user_id)
            .field("access_token", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}
