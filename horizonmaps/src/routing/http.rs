//! HTTP client abstraction for testability

use std::time::Duration;

use super::{BoxFuture, RoutingError};

/// Trait for async HTTP client operations.
///
/// Lets the directions client be exercised against canned responses.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    ///
    /// Non-success status codes are reported as errors.
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, RoutingError>>;
}

/// Real HTTP client implementation using reqwest.
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with a 30 second timeout.
    pub fn new() -> Result<Self, RoutingError> {
        Self::with_timeout(30)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, RoutingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RoutingError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, RoutingError>> {
        let url = url.to_string();
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| RoutingError::Http(format!("Request failed: {}", e.without_url())))?;

            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| RoutingError::Http(format!("Failed to read response: {}", e)))?;

            // Directions APIs answer 4xx with a JSON body naming the cause
            // (e.g. NoRoute); hand those to the parser instead of failing here.
            if status.is_success() || (status.is_client_error() && !body.is_empty()) {
                if !status.is_success() {
                    tracing::debug!(
                        status = status.as_u16(),
                        "Directions service returned client error"
                    );
                }
                return Ok(body.to_vec());
            }

            Err(RoutingError::Http(format!("HTTP {}", status)))
        })
    }
}
