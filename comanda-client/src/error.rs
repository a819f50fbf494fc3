//! Client error types

use thiserror::Error;

/// Transport and envelope errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or timeout
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status without a business error in the body
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Backend populated `erro`
    #[error("{0}")]
    Business(String),

    /// Malformed JSON
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed JSON with an unexpected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No candidate action answered without error
    #[error("No compatible action found after {attempts} attempt(s)")]
    ProbeExhausted { attempts: usize },

    /// Bad URL, header value or other configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ClientError {
    /// Backend rejected the request (as opposed to a transport failure)
    pub fn is_business(&self) -> bool {
        matches!(self, Self::Business(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Settings persistence errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Logger setup errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Log directory error: {0}")]
    Io(#[from] std::io::Error),

    /// A global subscriber is already installed
    #[error("Logger init failed: {0}")]
    Init(String),
}

/// Device authentication errors, worded for direct display
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Device serial number is not available")]
    MissingDeviceSerial,

    #[error("Authentication returned incomplete credentials")]
    IncompleteCredentials,

    #[error("Authentication rejected: {0}")]
    Rejected(String),

    #[error("Authentication failed: {0}")]
    Transport(ClientError),

    #[error("Could not save credentials: {0}")]
    Storage(#[from] SettingsError),
}

impl From<ClientError> for AuthError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Business(message) => Self::Rejected(message),
            other => Self::Transport(other),
        }
    }
}

/// Order submission errors
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Order submission failed: {0}")]
    Transport(ClientError),

    #[error("Could not encode order: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ClientError> for SubmitError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Business(message) => Self::Rejected(message),
            other => Self::Transport(other),
        }
    }
}

/// Cart validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Choose at least {required} option(s) from \"{group}\" ({selected} selected)")]
    MissingRequiredAddOns {
        group: String,
        required: u32,
        selected: u32,
    },

    #[error("Choose at most {max} option(s) from \"{group}\" ({selected} selected)")]
    TooManyAddOns { group: String, max: u32, selected: u32 },

    #[error("Add-on {0} is not offered for this product")]
    UnknownAddOn(String),
}
