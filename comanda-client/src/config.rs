//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | COMANDA_BASE_URL | https://integracao.example.com | Hosted integration endpoint |
//! | COMANDA_ENDPOINT_PATH | api/integracao | Fixed RPC path |
//! | COMANDA_MASTER_TENANT | 1 | Tenant used for device authentication |
//! | COMANDA_MASTER_TOKEN | (empty) | Vendor-level token for device authentication |
//! | COMANDA_AUTH_SHAPE | tenant-header | `tenant-header` or `vendor-token` |
//! | COMANDA_DEVICE_NAME | Comanda | `Nome` sent with the vendor-token shape |
//! | COMANDA_DEVICE_SERIAL | (hardware id) | Serial override |
//! | COMANDA_WAITER_ACTION | (none) | Preferred `module/function` for calling a waiter |
//! | COMANDA_TIMEOUT_SECS | 30 | Per-request timeout |
//! | COMANDA_CONNECT_TIMEOUT_SECS | 10 | Per-request connect timeout |
//! | COMANDA_SETTINGS_PATH | ./comanda/settings.json | Device settings file |

use crate::http::Action;
use std::path::PathBuf;
use std::str::FromStr;

/// Tenant baked in at build time (`COMANDA_TENANT_ID` when compiling)
pub const BUILD_TENANT_ID: Option<&str> = option_env!("COMANDA_TENANT_ID");
/// Last-resort tenant for the `empresa` query parameter
pub const FALLBACK_TENANT_ID: &str = "1";

/// Device authentication request shape.
///
/// Deployments disagree on this call: some expect the master tenant in the
/// `empresa` header with `{serialnumber}`, others a vendor token header with
/// `{serialnumber, Nome}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthShape {
    #[default]
    TenantHeader,
    VendorToken,
}

impl FromStr for AuthShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tenant-header" | "tenant" => Ok(Self::TenantHeader),
            "vendor-token" | "token" => Ok(Self::VendorToken),
            other => Err(format!("unknown auth shape: {other}")),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Hosted base URL (e.g., "https://integracao.example.com")
    pub base_url: String,
    /// RPC path appended to the base URL
    pub endpoint_path: String,
    /// Master context tenant
    pub master_tenant_id: String,
    /// Vendor-level master token
    pub master_token: String,
    pub auth_shape: AuthShape,
    /// `Nome` for the vendor-token auth shape
    pub device_name: String,
    /// Serial override; hardware fingerprint when unset
    pub device_serial: Option<String>,
    /// Preferred call-waiter action, tried before the built-in candidates
    pub waiter_action: Option<Action>,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Connect timeout in seconds
    pub connect_timeout: u64,
    pub settings_path: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint_path: "api/integracao".into(),
            master_tenant_id: FALLBACK_TENANT_ID.into(),
            master_token: String::new(),
            auth_shape: AuthShape::TenantHeader,
            device_name: "Comanda".into(),
            device_serial: None,
            waiter_action: None,
            timeout: 30,
            connect_timeout: 10,
            settings_path: PathBuf::from("./comanda/settings.json"),
        }
    }

    /// Load from the environment (and `.env`, if present)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            base_url: env_or("COMANDA_BASE_URL", defaults.base_url),
            endpoint_path: env_or("COMANDA_ENDPOINT_PATH", defaults.endpoint_path),
            master_tenant_id: env_or("COMANDA_MASTER_TENANT", defaults.master_tenant_id),
            master_token: env_or("COMANDA_MASTER_TOKEN", defaults.master_token),
            auth_shape: env_parse("COMANDA_AUTH_SHAPE").unwrap_or(defaults.auth_shape),
            device_name: env_or("COMANDA_DEVICE_NAME", defaults.device_name),
            device_serial: std::env::var("COMANDA_DEVICE_SERIAL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            waiter_action: std::env::var("COMANDA_WAITER_ACTION")
                .ok()
                .and_then(|raw| Action::parse(&raw)),
            timeout: env_parse("COMANDA_TIMEOUT_SECS").unwrap_or(defaults.timeout),
            connect_timeout: env_parse("COMANDA_CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout),
            settings_path: std::env::var("COMANDA_SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_path),
        }
    }

    pub fn with_endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint_path = path.into();
        self
    }

    pub fn with_master(mut self, tenant_id: impl Into<String>, token: impl Into<String>) -> Self {
        self.master_tenant_id = tenant_id.into();
        self.master_token = token.into();
        self
    }

    pub fn with_auth_shape(mut self, shape: AuthShape) -> Self {
        self.auth_shape = shape;
        self
    }

    pub fn with_device_serial(mut self, serial: impl Into<String>) -> Self {
        self.device_serial = Some(serial.into());
        self
    }

    pub fn with_waiter_action(mut self, action: Action) -> Self {
        self.waiter_action = Some(action);
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = path.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("https://integracao.example.com")
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
