//! Provider job API.
//!
//! [`JobApi`] is the seam between the search flow and the network: the
//! submitter and the polling monitor only ever talk to this trait, so
//! tests can script responses without a server.

use async_trait::async_trait;
use okza_core::JobId;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::client::HttpClient;
use crate::context::ApiSettings;
use crate::error::FetchError;

/// Path of the job creation endpoint.
pub const SUBMIT_ENDPOINT: &str = "/v3/merchant/google/products/task_post";

/// Path of the job status endpoint; the job id is appended as a segment.
pub const STATUS_ENDPOINT: &str = "/v3/merchant/google/products/task_get/advanced";

// ============================================================================
// Job Request
// ============================================================================

/// One job as sent in the submission body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequest {
    /// Location parameter.
    pub location_name: String,
    /// Language parameter.
    pub language_name: String,
    /// Keyword to search.
    pub keyword: String,
}

impl JobRequest {
    /// Creates a request.
    pub fn new(
        keyword: impl Into<String>,
        location: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            location_name: location.into(),
            language_name: language.into(),
            keyword: keyword.into(),
        }
    }
}

// ============================================================================
// Job API Trait
// ============================================================================

/// Raw access to the provider job endpoints.
///
/// Both calls return the decoded response body without interpreting it.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Creates a job.
    async fn submit(&self, auth_header: &str, request: &JobRequest) -> Result<Value, FetchError>;

    /// Reads the current state of a job.
    async fn status(&self, auth_header: &str, job_id: &JobId) -> Result<Value, FetchError>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

/// [`JobApi`] backed by the provider's HTTPS endpoints.
#[derive(Debug, Clone)]
pub struct MerchantApiClient {
    http: HttpClient,
    base_url: Url,
}

impl MerchantApiClient {
    /// Creates a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the base URL does not parse or
    /// cannot carry a path.
    pub fn new(base_url: &str, http: HttpClient) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    /// Creates a client from API settings.
    ///
    /// # Errors
    ///
    /// Fails on an unusable base URL or if the HTTP client cannot be built.
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, FetchError> {
        let http = HttpClient::with_timeout(settings.timeout)?;
        Self::new(&settings.base_url, http)
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn submit_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(SUBMIT_ENDPOINT);
        url
    }

    fn status_url(&self, job_id: &JobId) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(STATUS_ENDPOINT);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(job_id.as_str());
        }
        url
    }
}

#[async_trait]
impl JobApi for MerchantApiClient {
    #[instrument(skip(self, auth_header, request), fields(keyword = %request.keyword))]
    async fn submit(&self, auth_header: &str, request: &JobRequest) -> Result<Value, FetchError> {
        // The endpoint takes a list of jobs.
        let body = [request];
        self.http
            .post_json_with_auth(&self.submit_url(), auth_header, &body)
            .await
    }

    #[instrument(skip(self, auth_header), fields(job_id = %job_id))]
    async fn status(&self, auth_header: &str, job_id: &JobId) -> Result<Value, FetchError> {
        self.http
            .get_json_with_auth(&self.status_url(job_id), auth_header)
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
