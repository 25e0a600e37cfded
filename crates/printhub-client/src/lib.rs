//! Async HTTP client for the PrintHub storefront API
//!
//! One `ApiClient` per session. Endpoints are grouped by concern:
//! printing rates lookups with their fallback chain, cart management
//! with multipart upload, and order creation plus payment verification.

pub mod cart;
pub mod error;
pub mod orders;
pub mod rates;
pub mod types;

pub use error::ClientError;
pub use rates::RatesLookup;

use types::ApiErrorBody;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api/v1";

/// Base URL override, read from the environment.
pub const BASE_URL_ENV: &str = "PRINTHUB_API_URL";

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from `PRINTHUB_API_URL`, or the local default.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into `ClientError::Api`, preserving the
    /// backend's message when it sends one.
    pub(crate) async fn check(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = ApiClient::new("http://api.example.com/v1/");
        assert_eq!(client.url("/cart"), "http://api.example.com/v1/cart");
    }
}
