// Paperlib - Academic paper library client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! HTTP transport
//!
//! The API client describes each call as a [`RequestDescriptor`] and hands it to a
//! [`RequestExecutor`]. [`HttpExecutor`] is the reqwest-backed executor used in
//! production; tests plug in their own.
//!
//! # Failure shape
//! Executors report every failure as [`PaperlibError`]:
//! - non-2xx: `ApiRequestFailed` with the status, `"Request failed with status code N"`
//!   and the parsed [`ErrorBody`]
//! - connection failure: `ApiRequestFailed` with `"Network Error"`
//! - timeout: `ApiRequestFailed` with `"Request timed out"`
//! - cancellation: `Cancelled`

use crate::api::cancel::CancelSignal;
use crate::config::ClientConfig;
use crate::error::{ErrorBody, PaperlibError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Message for failures that never produced a response
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error";

/// Message for requests that ran past their timeout
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Fully resolved request, built fresh for every call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Route path, relative to the executor's base URL
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    /// JSON body for write verbs
    pub body: Option<Value>,
    /// Overrides the executor's default timeout
    pub timeout: Option<Duration>,
    pub signal: CancelSignal,
}

impl RequestDescriptor {
    pub fn new<S: Into<String>>(method: Method, url: S) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            signal: CancelSignal::never(),
        }
    }
}

/// Successful response
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` when the body is empty, a string when it is not JSON
    pub data: Value,
}

/// Performs a single request.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: RequestDescriptor) -> Result<TransportResponse>;
}

/// reqwest-backed executor
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    base_url: String,
}

impl HttpExecutor {
    /// Build the executor from client configuration
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| PaperlibError::invalid_config(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: RequestDescriptor) -> Result<TransportResponse> {
        let url = format!("{}{}", self.base_url, request.url);
        let endpoint = request.url;

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(method = %request.method, %url, "sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, &endpoint))?;

        let status = response.status();
        if status.is_success() {
            let data = read_body(response)
                .await
                .map_err(|e| transport_error(e, &endpoint))?;
            return Ok(TransportResponse {
                status: status.as_u16(),
                data,
            });
        }

        let data = read_body(response).await.unwrap_or(Value::Null);
        warn!(status = status.as_u16(), %endpoint, "request failed");

        Err(PaperlibError::api_failed(
            format!("Request failed with status code {}", status.as_u16()),
            Some(status.as_u16()),
            Some(endpoint),
            ErrorBody::from_value(&data),
        ))
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: RequestDescriptor) -> Result<TransportResponse> {
        let mut signal = request.signal.clone();
        if signal.is_cancelled() {
            return Err(PaperlibError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = signal.cancelled() => Err(PaperlibError::Cancelled),
            result = self.send(request) => result,
        }
    }
}

/// Read a response body as JSON
///
/// Empty bodies (e.g. 204) become `Null`; bodies that are not JSON are kept as text.
async fn read_body(response: Response) -> std::result::Result<Value, reqwest::Error> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

pub(crate) fn transport_error(error: reqwest::Error, endpoint: &str) -> PaperlibError {
    let message = if error.is_timeout() {
        TIMEOUT_MESSAGE.to_string()
    } else if error.is_connect() {
        NETWORK_ERROR_MESSAGE.to_string()
    } else if error.is_builder() {
        format!("Malformed request URL: {}", error)
    } else {
        error.to_string()
    };

    warn!(%endpoint, error = %error, "transport failure");
    PaperlibError::network_error(message, Some(endpoint.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_trims_trailing_slash() {
        let config = ClientConfig::builder()
            .base_url("https://api.example.org/v1/")
            .build();
        let executor = HttpExecutor::new(&config).unwrap();
        assert_eq!(executor.base_url(), "https://api.example.org/v1");
    }

    #[test]
    fn test_executor_rejects_invalid_config() {
        let config = ClientConfig::builder().base_url("not a url").build();
        assert!(matches!(
            HttpExecutor::new(&config),
            Err(PaperlibError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_signal_short_circuits() {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .build();
        let executor = HttpExecutor::new(&config).unwrap();

        let controller = crate::api::cancel::CancelController::new();
        let mut request = RequestDescriptor::new(Method::GET, "/papers");
        request.signal = controller.signal();
        controller.abort();

        let result = executor.execute(request).await;
        assert!(matches!(result, Err(PaperlibError::Cancelled)));
    }

    #[test]
    fn test_descriptor_defaults() {
        let request = RequestDescriptor::new(Method::DELETE, "/libraries/1");
        assert!(request.body.is_none());
        assert!(request.headers.is_empty());
        assert!(!request.signal.is_cancelled());
    }
}
