//! Shared OpenStack HTTP context
//!
//! Provides `OpenStackContext` for building one authenticated HTTP client
//! and creating the per-service clients from it.

use super::error::{classify_status, ApiError};
use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Header carrying the pre-issued keystone token
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Per-request timeout for API calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry policy for idempotent requests
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub min_delay: Duration,
    /// Cap for exponential growth
    pub max_delay: Duration,
    /// Number of retries after the first attempt
    pub max_times: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            max_times: 3,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_times)
            .with_jitter()
    }
}

/// Shared OpenStack context for creating service clients.
///
/// Holds one `reqwest::Client` and the auth token so every service client
/// reuses the same connection pool.
///
/// # Example
/// ```ignore
/// let ctx = OpenStackContext::new(token)?;
///
/// let heat = HeatClient::from_context(&ctx, heat_url);
/// let nova = ComputeClient::from_context(&ctx, nova_url);
/// ```
#[derive(Clone)]
pub struct OpenStackContext {
    http: reqwest::Client,
    token: Arc<str>,
    retry: RetryPolicy,
}

impl OpenStackContext {
    /// Build a context authenticating with a pre-issued token.
    pub fn new(token: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("heat-probe/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            token: Arc::from(token.into()),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy for idempotent requests.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).header(CONTENT_TYPE, "application/json")
    }

    pub(crate) fn delete(&self, url: &str) -> RequestBuilder {
        self.http.delete(url)
    }

    /// Send a request once, classifying unsuccessful statuses.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        resource_type: &'static str,
        resource_id: &str,
    ) -> Result<Response, ApiError> {
        let response = request
            .header(AUTH_TOKEN_HEADER, &*self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, &body, resource_type, resource_id))
    }

    /// GET a JSON document, retrying retryable failures with backoff.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        service: &'static str,
        resource_type: &'static str,
        resource_id: &str,
    ) -> Result<T, ApiError> {
        let fetch = || async {
            let request = self.get(url).query(query);
            let response = self.send(request, resource_type, resource_id).await?;
            decode(service, response).await
        };

        fetch
            .retry(self.retry.backoff())
            .when(ApiError::is_retryable)
            .notify(|error: &ApiError, delay: Duration| {
                debug!(
                    url = %url,
                    error = %error,
                    delay_ms = delay.as_millis(),
                    "Retrying request"
                );
            })
            .await
    }
}

/// Decode a JSON response body.
pub(crate) async fn decode<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| ApiError::Decode { service, source })
}

/// Join a service endpoint and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl std::fmt::Debug for OpenStackContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStackContext")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
