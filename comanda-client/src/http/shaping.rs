//! Request shaping
//!
//! Applied to every outgoing request in this order:
//!
//! 1. default `Accept`/`Content-Type`/`Cache-Control` headers when absent
//! 2. scheme/host/port taken from the runtime base URL, if set
//! 3. tenant headers from the credentials (never for device authentication,
//!    never over a header the caller set)
//! 4. `empresa` query parameter: runtime tenant, build-time tenant, fallback
//!
//! Stripping the response BOM happens on the way back, in
//! [`shared::response::Envelope::parse`].

use super::action::{Action, TENANT_KEY, TOKEN_HEADER, USER_HEADER};
use crate::config::{BUILD_TENANT_ID, FALLBACK_TENANT_ID};
use crate::error::{ClientError, ClientResult};
use reqwest::Url;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use shared::models::Credentials;

/// Request about to be sent
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub action: Action,
}

/// Runtime inputs to the shaping stages
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapingContext<'a> {
    /// Runtime base URL (scheme/host/port source)
    pub runtime_base_url: Option<&'a str>,
    /// Credentials to inject; `None` for the master transport
    pub tenant_credentials: Option<&'a Credentials>,
    /// Runtime tenant for the `empresa` query parameter
    pub runtime_tenant: Option<&'a str>,
}

/// Run all request stages in order
pub fn shape_request(request: &mut OutgoingRequest, ctx: &ShapingContext<'_>) -> ClientResult<()> {
    apply_default_headers(&mut request.headers);

    if let Some(base) = ctx.runtime_base_url.filter(|b| !b.trim().is_empty()) {
        rewrite_base_url(&mut request.url, base)?;
    }

    if let Some(credentials) = ctx.tenant_credentials
        && !request.action.is_authentication()
    {
        inject_tenant_headers(&mut request.headers, credentials)?;
    }

    ensure_tenant_query(&mut request.url, ctx.runtime_tenant);
    Ok(())
}

/// Stage 1
pub fn apply_default_headers(headers: &mut HeaderMap) {
    headers
        .entry(ACCEPT)
        .or_insert(HeaderValue::from_static("application/json"));
    headers
        .entry(CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
    headers
        .entry(CACHE_CONTROL)
        .or_insert(HeaderValue::from_static("no-cache"));
}

/// Stage 2: path and query are kept
pub fn rewrite_base_url(url: &mut Url, base: &str) -> ClientResult<()> {
    let base = Url::parse(base.trim())
        .map_err(|e| ClientError::Config(format!("invalid base URL {base}: {e}")))?;
    let host = base
        .host_str()
        .ok_or_else(|| ClientError::Config(format!("base URL {base} has no host")))?;

    url.set_scheme(base.scheme())
        .map_err(|_| ClientError::Config(format!("cannot switch scheme to {}", base.scheme())))?;
    url.set_host(Some(host))
        .map_err(|e| ClientError::Config(format!("invalid host {host}: {e}")))?;
    url.set_port(base.port())
        .map_err(|_| ClientError::Config(format!("cannot set port on {url}")))?;
    Ok(())
}

/// Stage 3
pub fn inject_tenant_headers(headers: &mut HeaderMap, credentials: &Credentials) -> ClientResult<()> {
    let pairs = [
        (TENANT_KEY, credentials.tenant_id.as_str()),
        (USER_HEADER, credentials.user_id.as_str()),
        (TOKEN_HEADER, credentials.access_token.as_str()),
    ];
    for (name, value) in pairs {
        if value.is_empty() || headers.contains_key(name) {
            continue;
        }
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Config(format!("invalid {name} header value: {e}")))?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(())
}

/// Stage 4
pub fn ensure_tenant_query(url: &mut Url, runtime_tenant: Option<&str>) {
    if url.query_pairs().any(|(key, _)| key == TENANT_KEY) {
        return;
    }
    let tenant = tenant_query_value(runtime_tenant);
    url.query_pairs_mut().append_pair(TENANT_KEY, tenant);
}

/// Runtime value, then build-time value, then the hardcoded fallback
pub fn tenant_query_value(runtime_tenant: Option<&str>) -> &str {
    runtime_tenant
        .filter(|t| !t.trim().is_empty())
        .or(BUILD_TENANT_ID.filter(|t| !t.trim().is_empty()))
        .unwrap_or(FALLBACK_TENANT_ID)
}

/// Header list for logging, with the access token masked
pub fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if name.as_str() == TOKEN_HEADER {
                "***".to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::action::{AUTHENTICATE_DEVICE, SUBMIT_ORDER};

    fn outgoing(action: Action) -> OutgoingRequest {
        OutgoingRequest {
            url: Url::parse("https://integracao.example.com/api/integracao").unwrap(),
            headers: HeaderMap::new(),
            action,
        }
    }

    #[test]
    fn test_default_headers_keep_caller_values() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));
        apply_default_headers(&mut headers);
        assert_eq!(headers[ACCEPT], "text/plain");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
    }

    #[test]
    fn test_rewrite_base_url_keeps_path_and_query() {
        let mut url = Url::parse("https://integracao.example.com/api/integracao?x=1").unwrap();
        rewrite_base_url(&mut url, "http://192.168.0.10:8080").unwrap();
        assert_eq!(url.as_str(), "http://192.168.0.10:8080/api/integracao?x=1");

        rewrite_base_url(&mut url, "https://cloud.example.com").unwrap();
        assert_eq!(url.as_str(), "https://cloud.example.com/api/integracao?x=1");
    }

    #[test]
    fn test_rewrite_rejects_garbage() {
        let mut url = Url::parse("https://integracao.example.com/api").unwrap();
        assert!(matches!(
            rewrite_base_url(&mut url, "not a url"),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_tenant_headers_do_not_override_caller() {
        let creds = Credentials::new("10", "5", "tok");
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_KEY, HeaderValue::from_static("99"));
        inject_tenant_headers(&mut headers, &creds).unwrap();
        assert_eq!(headers[TENANT_KEY], "99");
        assert_eq!(headers[USER_HEADER], "5");
        assert_eq!(headers[TOKEN_HEADER], "tok");
    }

    #[test]
    fn test_empty_user_not_injected() {
        let creds = Credentials::new("10", "", "tok");
        let mut headers = HeaderMap::new();
        inject_tenant_headers(&mut headers, &creds).unwrap();
        assert!(!headers.contains_key(USER_HEADER));
    }

    #[test]
    fn test_authentication_skips_tenant_headers() {
        let creds = Credentials::new("10", "5", "tok");
        let mut request = outgoing(AUTHENTICATE_DEVICE);
        let ctx = ShapingContext {
            tenant_credentials: Some(&creds),
            runtime_tenant: Some("10"),
            ..Default::default()
        };
        shape_request(&mut request, &ctx).unwrap();
        assert!(!request.headers.contains_key(TOKEN_HEADER));
        assert!(!request.headers.contains_key(TENANT_KEY));
    }

    #[test]
    fn test_full_pipeline() {
        let creds = Credentials::new("10", "5", "tok");
        let mut request = outgoing(SUBMIT_ORDER);
        let ctx = ShapingContext {
            runtime_base_url: Some("http://10.0.0.2:9000"),
            tenant_credentials: Some(&creds),
            runtime_tenant: Some("10"),
        };
        shape_request(&mut request, &ctx).unwrap();
        assert_eq!(
            request.url.as_str(),
            "http://10.0.0.2:9000/api/integracao?empresa=10"
        );
        assert_eq!(request.headers[TOKEN_HEADER], "tok");
        assert_eq!(request.headers[ACCEPT], "application/json");
    }

    #[test]
    fn test_tenant_query_not_duplicated() {
        let mut url = Url::parse("https://h.example.com/api?empresa=7").unwrap();
        ensure_tenant_query(&mut url, Some("10"));
        assert_eq!(url.query(), Some("empresa=7"));
    }

    #[test]
    fn test_tenant_query_precedence() {
        assert_eq!(tenant_query_value(Some("10")), "10");
        let expected = BUILD_TENANT_ID
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(FALLBACK_TENANT_ID);
        assert_eq!(tenant_query_value(Some("")), expected);
        assert_eq!(tenant_query_value(None), expected);
    }

    #[test]
    fn test_redact_token() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("secret"));
        headers.insert(TENANT_KEY, HeaderValue::from_static("10"));
        let shown = redact_headers(&headers);
        assert!(shown.contains(&("token".to_string(), "***".to_string())));
        assert!(shown.contains(&("empresa".to_string(), "10".to_string())));
    }
}
