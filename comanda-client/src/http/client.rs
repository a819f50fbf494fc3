//! Envelope client
//!
//! Posts a JSON body to the single integration endpoint, routing by the
//! `modulo`/`funcao` headers, and decodes the `{sucesso, erro}` envelope.

use super::action::{Action, FUNCTION_HEADER, MODULE_HEADER};
use super::shaping::{OutgoingRequest, ShapingContext, redact_headers, shape_request};
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use shared::response::Envelope;
use std::sync::Arc;
use std::time::Duration;

/// Response bodies longer than this are truncated in logs and errors
const MAX_LOGGED_BODY: usize = 2048;

/// One RPC call
#[derive(Debug, Clone)]
pub struct RpcRequest {
    pub action: Action,
    /// Caller-set headers; shaping never overrides these
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Value,
}

impl RpcRequest {
    pub fn new(action: Action, body: Value) -> Self {
        Self {
            action,
            headers: Vec::new(),
            query: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Anything that can carry an [`RpcRequest`] to the backend
#[async_trait]
pub trait EnvelopeTransport: Send + Sync {
    /// Raw envelope; a populated `erro` is returned as `Ok`
    async fn call(&self, request: RpcRequest) -> ClientResult<Envelope>;

    /// Success payload, or [`ClientError::Business`] when `erro` is set
    async fn call_success(&self, request: RpcRequest) -> ClientResult<Value> {
        let action = request.action.clone();
        self.call(request).await?.into_result().map_err(|message| {
            tracing::debug!(%action, error = %message, "Backend rejected request");
            ClientError::Business(message)
        })
    }
}

#[derive(Debug, Clone)]
enum Profile {
    /// Tenant headers injected from the credential store
    Tenant,
    /// Device authentication only: no tenant injection
    Master { tenant_id: String },
}

/// reqwest-backed [`EnvelopeTransport`]
#[derive(Debug, Clone)]
pub struct EnvelopeClient {
    http: Client,
    endpoint: Url,
    credentials: Arc<CredentialStore>,
    profile: Profile,
}

impl EnvelopeClient {
    /// Tenant-scoped client used for every call after authentication
    pub fn new(config: &ClientConfig, credentials: Arc<CredentialStore>) -> ClientResult<Self> {
        Self::build(config, credentials, Profile::Tenant)
    }

    /// Master-context client for device authentication.
    ///
    /// Still follows the runtime base URL, but never injects tenant headers.
    pub fn master(config: &ClientConfig, credentials: Arc<CredentialStore>) -> ClientResult<Self> {
        let profile = Profile::Master {
            tenant_id: config.master_tenant_id.clone(),
        };
        Self::build(config, credentials, profile)
    }

    fn build(config: &ClientConfig, credentials: Arc<CredentialStore>, profile: Profile) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint_url(&config.base_url, &config.endpoint_path)?,
            credentials,
            profile,
        })
    }

    /// Configured endpoint before runtime base URL rewriting
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn is_master(&self) -> bool {
        matches!(self.profile, Profile::Master { .. })
    }

    /// Build and shape the outgoing request without sending it
    pub fn prepare(&self, request: &RpcRequest) -> ClientResult<OutgoingRequest> {
        let mut url = self.endpoint.clone();
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            headers.insert(header_name(name)?, header_value(name, value)?);
        }
        headers.insert(
            HeaderName::from_static(MODULE_HEADER),
            header_value(MODULE_HEADER, &request.action.module)?,
        );
        headers.insert(
            HeaderName::from_static(FUNCTION_HEADER),
            header_value(FUNCTION_HEADER, &request.action.function)?,
        );

        let mut outgoing = OutgoingRequest {
            url,
            headers,
            action: request.action.clone(),
        };

        let credentials = self.credentials.snapshot();
        let ctx = match &self.profile {
            Profile::Tenant => ShapingContext {
                runtime_base_url: credentials.base_url.as_deref(),
                tenant_credentials: Some(credentials.as_ref()),
                runtime_tenant: Some(credentials.tenant_id.as_str()),
            },
            Profile::Master { tenant_id } => ShapingContext {
                runtime_base_url: credentials.base_url.as_deref(),
                tenant_credentials: None,
                runtime_tenant: Some(tenant_id.as_str()),
            },
        };
        shape_request(&mut outgoing, &ctx)?;
        Ok(outgoing)
    }
}

#[async_trait]
impl EnvelopeTransport for EnvelopeClient {
    async fn call(&self, request: RpcRequest) -> ClientResult<Envelope> {
        let outgoing = self.prepare(&request)?;
        let action = &request.action;

        tracing::debug!(
            %action,
            url = %outgoing.url,
            headers = ?redact_headers(&outgoing.headers),
            body = %request.body,
            "RPC request"
        );

        let response = self
            .http
            .post(outgoing.url)
            .headers(outgoing.headers)
            .body(serde_json::to_vec(&request.body)?)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let text = String::from_utf8_lossy(&bytes);

        tracing::debug!(
            %action,
            status = status.as_u16(),
            body = %loggable_body(action, &text),
            "RPC response"
        );

        let parsed = Envelope::parse(&text);
        if !status.is_success() {
            return match parsed {
                Ok(envelope) if !envelope.is_success() => Ok(envelope),
                _ => Err(ClientError::Status {
                    status: status.as_u16(),
                    body: truncate(&text).to_string(),
                }),
            };
        }

        Ok(parsed?)
    }
}

/// `base_url` + `endpoint_path`, tolerant of missing/extra slashes
fn endpoint_url(base_url: &str, endpoint_path: &str) -> ClientResult<Url> {
    let base = format!("{}/", base_url.trim().trim_end_matches('/'));
    let base = Url::parse(&base)
        .map_err(|e| ClientError::Config(format!("invalid base URL {base_url}: {e}")))?;
    base.join(endpoint_path.trim().trim_start_matches('/'))
        .map_err(|e| ClientError::Config(format!("invalid endpoint path {endpoint_path}: {e}")))
}

fn header_name(name: &str) -> ClientResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ClientError::Config(format!("invalid header name {name}: {e}")))
}

fn header_value(name: &str, value: &str) -> ClientResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::Config(format!("invalid {name} header value: {e}")))
}

/// Authentication responses carry the access token; never log them
fn loggable_body<'a>(action: &Action, body: &'a str) -> &'a str {
    if action.is_authentication() {
        "<redacted>"
    } else {
        truncate(body)
    }
}

fn truncate(body: &str) -> &str {
    if body.len() <= MAX_LOGGED_BODY {
        return body;
    }
    let mut end = MAX_LOGGED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
