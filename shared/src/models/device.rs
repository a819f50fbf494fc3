//! Device settings and table identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating role of the tablet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    /// Fixed to one table
    Table,
    /// Counter (balcão)
    Counter,
}

impl DeviceRole {
    /// Role assigned when authentication first configures a device
    pub const DEFAULT: DeviceRole = DeviceRole::Counter;
}

/// Locally persisted device settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(default)]
    pub role: Option<DeviceRole>,
    #[serde(default)]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub device_serial: Option<String>,
    /// Runtime base URL override
    #[serde(default)]
    pub base_url: Option<String>,
}

impl DeviceSettings {
    /// Counter role, or table role with a table number
    pub fn is_configured(&self) -> bool {
        match self.role {
            Some(DeviceRole::Counter) => true,
            Some(DeviceRole::Table) => self.table_number.is_some(),
            None => false,
        }
    }

    /// Label orders from this device are delivered to
    pub fn table_label(&self) -> Option<TableLabel> {
        match self.role? {
            DeviceRole::Counter => Some(TableLabel::Counter),
            DeviceRole::Table => self.table_number.map(|n| TableLabel::Table(n.to_string())),
        }
    }
}

/// Where an order is delivered: a numbered table or the counter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableLabel {
    Table(String),
    Counter,
}

impl TableLabel {
    /// Parse user or settings input: `"12"`, `"MESA 12"`, `"BALCÃO"`, `"balcao"`
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let upper = trimmed.to_uppercase();
        match upper.as_str() {
            "" | "BALCÃO" | "BALCAO" | "COUNTER" => Self::Counter,
            _ => {
                let number = upper
                    .strip_prefix("MESA")
                    .map(str::trim)
                    .unwrap_or(trimmed);
                Self::Table(number.to_string())
            }
        }
    }

    /// Delivery address and notification text (`MESA 12`, `BALCÃO`)
    pub fn delivery_label(&self) -> String {
        match self {
            Self::Table(number) => format!("MESA {number}"),
            Self::Counter => "BALCÃO".to_string(),
        }
    }

    /// Customer name placeholder (`Mesa 12`, `Balcão`)
    pub fn customer_name(&self) -> String {
        match self {
            Self::Table(number) => format!("Mesa {number}"),
            Self::Counter => "Balcão".to_string(),
        }
    }
}

impl fmt::Display for TableLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.delivery_label())
    }
}
