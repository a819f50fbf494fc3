//! Process-wide tenant credentials
//!
//! Readers take an `Arc` snapshot; writers replace the whole record, so a
//! reader never sees a new tenant with a stale token.

use shared::models::{Credentials, DeviceSettings};
use std::sync::{Arc, RwLock};

/// Shared holder for the current [`Credentials`]
#[derive(Debug, Default)]
pub struct CredentialStore {
    current: RwLock<Arc<Credentials>>,
}

impl CredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            current: RwLock::new(Arc::new(credentials)),
        }
    }

    /// Credentials restored from persisted settings
    pub fn from_settings(settings: &DeviceSettings) -> Self {
        let credentials = Credentials::new(
            settings.tenant_id.clone().unwrap_or_default(),
            settings.user_id.clone().unwrap_or_default(),
            settings.access_token.clone().unwrap_or_default(),
        )
        .with_base_url(settings.base_url.clone());
        Self::new(credentials)
    }

    /// Current record
    pub fn snapshot(&self) -> Arc<Credentials> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swap in a new record
    pub fn replace(&self, credentials: Credentials) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(credentials);
    }

    /// Switch the runtime base URL (hosted vs local network), keeping identity
    pub fn set_base_url(&self, base_url: Option<String>) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let updated = guard.as_ref().clone().with_base_url(base_url);
        *guard = Arc::new(updated);
    }

    /// Drop tenant identity, keeping the runtime base URL
    pub fn clear(&self) {
        let base_url = self.snapshot().base_url.clone();
        self.replace(Credentials::default().with_base_url(base_url));
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }
}
