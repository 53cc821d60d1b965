//! HTTP client for the listing and vocabulary endpoints.
//!
//! One `reqwest` client is built up front with the configured timeout and
//! reused for every request. Responses are checked for a 2xx status before
//! decoding; any transport, status, or decode failure surfaces as an
//! [`ApiError`] and fails the request it belongs to.

use crate::api::endpoints::ListingEndpoint;
use crate::api::raw::{ListingEnvelope, NamedEnvelope, NamedItem, RawRecord};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Error type for upstream API failures.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("cannot connect to {url}: {source}")]
    Connect {
        url: String,
        source: reqwest::Error,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    fn from_send(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            ApiError::Connect {
                url: url.to_string(),
                source: e,
            }
        } else {
            ApiError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

/// Client for the legacy listing API.
#[derive(Debug, Clone)]
pub struct ListingClient {
    http: reqwest::Client,
}

impl ListingClient {
    /// Create a new client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { http })
    }

    /// Fetch one listing endpoint and return its raw records.
    pub async fn fetch_listing(
        &self,
        endpoint: &ListingEndpoint,
    ) -> Result<Vec<RawRecord>, ApiError> {
        debug!("GET {}", endpoint.url);

        let response = self
            .http
            .get(&endpoint.url)
            .send()
            .await
            .map_err(|e| ApiError::from_send(&endpoint.url, e))?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                url: endpoint.url.clone(),
                status: response.status(),
            });
        }

        let envelope: ListingEnvelope =
            response.json().await.map_err(|e| ApiError::Decode {
                url: endpoint.url.clone(),
                source: e,
            })?;

        let records = envelope.into_records();
        debug!("{} returned {} records", endpoint.url, records.len());
        Ok(records)
    }

    /// Fetch a v2 `challengetypes` endpoint and return the type names.
    pub async fn fetch_challenge_types(&self, url: &str) -> Result<Vec<String>, ApiError> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_send(url, e))?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let items: Vec<NamedItem> = response.json().await.map_err(|e| ApiError::Decode {
            url: url.to_string(),
            source: e,
        })?;

        Ok(items.into_iter().map(|item| item.name).collect())
    }

    /// Fetch the v3 `technologies` endpoint and return the tag names.
    pub async fn fetch_technologies(&self, url: &str) -> Result<Vec<String>, ApiError> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_send(url, e))?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let envelope: NamedEnvelope = response.json().await.map_err(|e| ApiError::Decode {
            url: url.to_string(),
            source: e,
        })?;

        Ok(envelope
            .result
            .content
            .into_iter()
            .map(|item| item.name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_offline() {
        let client = ListingClient::new(Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            url: "http://api/v2/challenges/active?type=design".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("challenges/active"));

        let err = ApiError::Timeout {
            url: "http://api/v2".to_string(),
        };
        assert!(err.to_string().contains("timed out"));
    }
}
