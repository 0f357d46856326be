//! HTTP client with tracing and JSON helpers.
//!
//! Wraps `reqwest` so that every provider call:
//! - carries a Basic `Authorization` header supplied by the caller
//! - has a per-request timeout
//! - maps HTTP failures to [`FetchError`] variants
//! - returns the body as raw JSON for defensive navigation

use reqwest::{Client, Response, StatusCode, header};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::FetchError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for Okza.
const USER_AGENT: &str = concat!("okza/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper used by the provider API client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { inner: client })
    }

    /// Performs a GET request with an authorization header and parses JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] for transport failures, non-success status
    /// codes, or a body that is not JSON.
    #[instrument(skip(self, auth_header), fields(url = %url))]
    pub async fn get_json_with_auth(&self, url: &Url, auth_header: &str) -> Result<Value, FetchError> {
        debug!("GET request with auth");

        let response = self
            .inner
            .get(url.clone())
            .header(header::AUTHORIZATION, auth_header)
            .send()
            .await?;

        read_json(response).await
    }

    /// Performs a POST request with a JSON body and an authorization header.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] for transport failures, non-success status
    /// codes, or a body that is not JSON.
    #[instrument(skip(self, auth_header, body), fields(url = %url))]
    pub async fn post_json_with_auth<T: Serialize + ?Sized>(
        &self,
        url: &Url,
        auth_header: &str,
        body: &T,
    ) -> Result<Value, FetchError> {
        debug!("POST request with JSON");

        let response = self
            .inner
            .post(url.clone())
            .header(header::AUTHORIZATION, auth_header)
            .json(body)
            .send()
            .await?;

        read_json(response).await
    }
}

/// Checks the status code and parses the body as JSON.
async fn read_json(response: Response) -> Result<Value, FetchError> {
    let status = response.status();
    debug!(status = %status, "Response received");

    if response.is_rate_limited() {
        let retry_after = response.retry_after_secs();
        warn!(retry_after = ?retry_after, "Rate limited by provider");
        return Err(FetchError::RateLimited { retry_after });
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::AuthenticationFailed(format!(
            "Provider rejected credentials (HTTP {status})"
        )));
    }

    if !status.is_success() {
        return Err(FetchError::InvalidResponse(format!(
            "Unexpected status code: {status}"
        )));
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Check if the response indicates rate limiting.
    fn is_rate_limited(&self) -> bool;

    /// Get the Retry-After header value in seconds.
    fn retry_after_secs(&self) -> Option<u64>;
}

impl ResponseExt for Response {
    fn is_rate_limited(&self) -> bool {
        self.status() == StatusCode::TOO_MANY_REQUESTS
    }

    fn retry_after_secs(&self) -> Option<u64> {
        self.headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&server.uri()).unwrap().join(p).unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_auth_and_parses_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header_eq("authorization", "Basic abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let body = client.get_json_with_auth(&url(&server, "/ping"), "Basic abc").await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client.get_json_with_auth(&url(&server, "/x"), "Basic abc").await.unwrap_err();
        assert!(matches!(err, FetchError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client.get_json_with_auth(&url(&server, "/x"), "Basic abc").await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { retry_after: Some(7) }));
    }

    #[tokio::test]
    async fn test_non_json_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client.get_json_with_auth(&url(&server, "/x"), "Basic abc").await.unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }
}
