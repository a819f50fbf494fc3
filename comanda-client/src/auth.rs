//! Device authentication bootstrap
//!
//! Exchanges the device serial for tenant credentials through the
//! authenticate-device action, using the master context.
//!
//! ```text
//! 1. resolve serial (override > persisted > hardware fingerprint)
//! 2. POST authenticate-device on the master transport (no tenant headers)
//! 3. require non-empty `empresa` and `token` in `sucesso`
//! 4. persist settings, then swap the credential record
//! ```
//!
//! Any failure leaves credentials and settings untouched. One attempt per
//! call; retrying is up to the caller.

use crate::config::{AuthShape, ClientConfig};
use crate::credentials::CredentialStore;
use crate::device::resolve_device_serial;
use crate::error::AuthError;
use crate::http::action::{AUTHENTICATE_DEVICE, TENANT_KEY, TOKEN_HEADER};
use crate::http::{EnvelopeClient, EnvelopeTransport, RpcRequest};
use crate::settings::SettingsStore;
use serde_json::{Map, Value, json};
use shared::models::{Credentials, DeviceRole, DeviceSettings};
use shared::util::value_to_string;
use std::sync::Arc;

/// Master context for the authentication call
#[derive(Debug, Clone)]
pub struct MasterContext {
    pub tenant_id: String,
    /// Vendor-level token (vendor-token shape only)
    pub vendor_token: String,
    pub shape: AuthShape,
    /// `Nome` (vendor-token shape only)
    pub device_name: String,
}

impl MasterContext {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            tenant_id: config.master_tenant_id.clone(),
            vendor_token: config.master_token.clone(),
            shape: config.auth_shape,
            device_name: config.device_name.clone(),
        }
    }
}

pub struct DeviceAuthenticator {
    transport: Arc<dyn EnvelopeTransport>,
    credentials: Arc<CredentialStore>,
    settings: Arc<dyn SettingsStore>,
    master: MasterContext,
    serial_override: Option<String>,
}

impl DeviceAuthenticator {
    pub fn new(
        transport: Arc<dyn EnvelopeTransport>,
        credentials: Arc<CredentialStore>,
        settings: Arc<dyn SettingsStore>,
        master: MasterContext,
    ) -> Self {
        Self {
            transport,
            credentials,
            settings,
            master,
            serial_override: None,
        }
    }

    /// Authenticator over a fresh master-profile [`EnvelopeClient`]
    pub fn from_config(
        config: &ClientConfig,
        credentials: Arc<CredentialStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self, AuthError> {
        let transport = EnvelopeClient::master(config, credentials.clone())?;
        let mut authenticator =
            Self::new(Arc::new(transport), credentials, settings, MasterContext::from_config(config));
        authenticator.serial_override = config.device_serial.clone();
        Ok(authenticator)
    }

    pub fn with_serial_override(mut self, serial: impl Into<String>) -> Self {
        self.serial_override = Some(serial.into());
        self
    }

    /// Resolve the device serial and authenticate with it
    pub async fn bootstrap(&self) -> Result<Credentials, AuthError> {
        let persisted = self.settings.load()?.device_serial;
        let serial = resolve_device_serial(self.serial_override.as_deref(), persisted.as_deref())
            .ok_or(AuthError::MissingDeviceSerial)?;
        self.authenticate(&serial).await
    }

    /// Exchange `device_serial` for tenant credentials
    pub async fn authenticate(&self, device_serial: &str) -> Result<Credentials, AuthError> {
        let device_serial = device_serial.trim();
        if device_serial.is_empty() {
            return Err(AuthError::MissingDeviceSerial);
        }

        tracing::info!(serial = %device_serial, shape = ?self.master.shape, "Authenticating device");

        let request = self.build_request(device_serial);
        let payload = self.transport.call_success(request).await.map_err(|e| {
            tracing::warn!(error = %e, "Device authentication failed");
            AuthError::from(e)
        })?;

        let base_url = self.credentials.snapshot().base_url.clone();
        let credentials = parse_credentials(&payload)
            .ok_or(AuthError::IncompleteCredentials)?
            .with_base_url(base_url);

        self.settings.update(&mut |settings: &mut DeviceSettings| {
            settings.tenant_id = Some(credentials.tenant_id.clone());
            settings.user_id = Some(credentials.user_id.clone());
            settings.access_token = Some(credentials.access_token.clone());
            settings.device_serial = Some(device_serial.to_string());
            if !settings.is_configured() {
                settings.role = Some(DeviceRole::DEFAULT);
            }
        })?;
        self.credentials.replace(credentials.clone());

        tracing::info!(
            tenant = %credentials.tenant_id,
            user = %credentials.user_id,
            "Device authenticated"
        );
        Ok(credentials)
    }

    fn build_request(&self, device_serial: &str) -> RpcRequest {
        let master = &self.master;
        let request = match master.shape {
            AuthShape::TenantHeader => RpcRequest::new(
                AUTHENTICATE_DEVICE,
                json!({ "serialnumber": device_serial }),
            )
            .header(TENANT_KEY, &master.tenant_id),
            AuthShape::VendorToken => RpcRequest::new(
                AUTHENTICATE_DEVICE,
                json!({ "serialnumber": device_serial, "Nome": master.device_name }),
            )
            .header(TOKEN_HEADER, &master.vendor_token),
        };
        request.query(TENANT_KEY, &master.tenant_id)
    }
}

/// Credentials from an authentication payload; `None` when tenant or token
/// is missing. Accepts an object or a one-element list of objects.
fn parse_credentials(payload: &Value) -> Option<Credentials> {
    let record = match payload {
        Value::Array(items) => items.first()?.as_object()?,
        Value::Object(obj) => obj,
        _ => return None,
    };

    let tenant_id = first_string(record, &["empresa", "tenant_id"])?;
    let access_token = first_string(record, &["token", "access_token"])?;
    let user_id = first_string(record, &["usuario", "user_id"]).unwrap_or_default();

    Some(Credentials::new(tenant_id, user_id, access_token))
}

fn first_string(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .filter_map(value_to_string)
        .find(|s| !s.is_empty())
}
