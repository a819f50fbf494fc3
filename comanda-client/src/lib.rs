//! Comanda Client - ordering client for the vendor integration backend
//!
//! Authenticates a tablet by serial number, then talks to the single
//! header-routed RPC endpoint on behalf of the tenant: catalog, add-ons,
//! call-waiter and order submission.

pub mod addons;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod credentials;
pub mod device;
pub mod error;
pub mod http;
pub mod logger;
pub mod order;
pub mod probe;
pub mod settings;

#[cfg(test)]
mod testing;

pub use addons::{AddOnPayload, AddOnResolver, normalize};
pub use auth::{DeviceAuthenticator, MasterContext};
pub use cart::{Cart, CartLine, CartTotals};
pub use catalog::{Catalog, ImageResolver};
pub use config::{AuthShape, ClientConfig};
pub use credentials::CredentialStore;
pub use error::{AuthError, CartError, ClientError, ClientResult, LoggerError, SettingsError, SubmitError};
pub use http::{Action, EnvelopeClient, EnvelopeTransport, RpcRequest};
pub use order::{OrderAssembler, OrderOptions, SubmittedOrder};
pub use probe::Prober;
pub use settings::{JsonSettingsStore, MemorySettingsStore, SettingsStore};

// Re-export shared types for convenience
pub use shared::models::{AddOnGroup, AddOnOption, Credentials, DeviceRole, DeviceSettings, Product, TableLabel};

use std::sync::Arc;

/// Everything a tablet needs, wired over one credential store
pub struct ComandaClient {
    settings: Arc<dyn SettingsStore>,
    credentials: Arc<CredentialStore>,
    authenticator: DeviceAuthenticator,
    catalog: Catalog,
    add_ons: AddOnResolver,
    orders: OrderAssembler,
    images: ImageResolver,
}

impl ComandaClient {
    /// Restore credentials from `settings` and build the transports
    pub fn new(config: ClientConfig, settings: Arc<dyn SettingsStore>) -> ClientResult<Self> {
        let stored = settings.load()?;
        let credentials = Arc::new(CredentialStore::from_settings(&stored));

        let transport: Arc<dyn EnvelopeTransport> = Arc::new(EnvelopeClient::new(&config, credentials.clone())?);
        let master = EnvelopeClient::master(&config, credentials.clone())?;
        let mut authenticator = DeviceAuthenticator::new(
            Arc::new(master),
            credentials.clone(),
            settings.clone(),
            MasterContext::from_config(&config),
        );
        if let Some(serial) = &config.device_serial {
            authenticator = authenticator.with_serial_override(serial);
        }

        tracing::info!(
            base_url = %config.base_url,
            authenticated = credentials.is_authenticated(),
            configured = stored.is_configured(),
            "Comanda client ready"
        );

        Ok(Self {
            catalog: Catalog::new(transport.clone()).with_waiter_action(config.waiter_action.clone()),
            add_ons: AddOnResolver::new(transport.clone()),
            orders: OrderAssembler::new(transport),
            images: ImageResolver::new(),
            settings,
            credentials,
            authenticator,
        })
    }

    /// Config from the environment, settings in the configured JSON file
    pub fn from_env() -> ClientResult<Self> {
        let config = ClientConfig::from_env();
        let settings = Arc::new(JsonSettingsStore::new(config.settings_path.clone()));
        Self::new(config, settings)
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn authenticator(&self) -> &DeviceAuthenticator {
        &self.authenticator
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn add_ons(&self) -> &AddOnResolver {
        &self.add_ons
    }

    pub fn orders(&self) -> &OrderAssembler {
        &self.orders
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    /// Authenticate with the resolved device serial
    pub async fn authenticate(&self) -> Result<Credentials, AuthError> {
        self.authenticator.bootstrap().await
    }

    /// Set the operating role; a table role needs a table number to count as
    /// configured.
    pub fn configure_device(&self, role: DeviceRole, table_number: Option<u32>) -> ClientResult<DeviceSettings> {
        let settings = self.settings.update(&mut |settings: &mut DeviceSettings| {
            settings.role = Some(role);
            settings.table_number = match role {
                DeviceRole::Table => table_number,
                DeviceRole::Counter => None,
            };
        })?;
        tracing::info!(?role, table = ?settings.table_number, "Device configured");
        Ok(settings)
    }

    /// Switch between hosted and local-network backends. `None` returns to the
    /// configured base URL.
    pub fn set_base_url(&self, base_url: Option<String>) -> ClientResult<()> {
        let base_url = base_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        self.settings.update(&mut |settings: &mut DeviceSettings| settings.base_url = base_url.clone())?;
        self.credentials.set_base_url(base_url);
        Ok(())
    }

    /// Table label from the persisted settings, if the device is configured
    pub fn table_label(&self) -> ClientResult<Option<TableLabel>> {
        Ok(self.settings.load()?.table_label())
    }
}
