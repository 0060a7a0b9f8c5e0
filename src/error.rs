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


//! Error types for Paperlib
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are categorized by where they originate (identity, transport, decoding,
//! configuration) so the API client can pick the right notification for each.
//!
//! ## User-facing messages
//!
//! Every failure that reaches the user is reduced to one line of text by
//! [`PaperlibError::user_message`]. The text is picked by trying an ordered list of
//! extractors against the error:
//!
//! 1. `message` field of the structured server error body
//! 2. `detail` field of the structured server error body
//! 3. the error's own message
//! 4. [`FALLBACK_ERROR_MESSAGE`]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type alias using our PaperlibError type
pub type Result<T> = std::result::Result<T, PaperlibError>;

/// Shown when nothing more specific can be extracted from a failure.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Shown when a call requires a signed-in user and there is none.
pub const NOT_SIGNED_IN_MESSAGE: &str = "You need to be logged in to perform this action.";

/// Structured error body returned by the paper service.
///
/// The service answers with `{"message": ...}` for domain errors and with
/// `{"detail": ...}` for framework errors. `detail` is either a plain string or a
/// list of validation entries (`[{"loc": [...], "msg": "...", "type": "..."}]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Parse an error body out of an arbitrary JSON response.
    ///
    /// Returns `None` for anything that is not a JSON object. Fields are read
    /// independently; a `message` that is not a string is ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            message: object
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            detail: object.get("detail").filter(|d| !d.is_null()).cloned(),
        })
    }

    /// The `detail` field rendered as text.
    ///
    /// Validation lists are flattened to their `msg` entries joined by `"; "`.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(entries) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

/// Main error type for Paperlib
#[derive(Error, Debug)]
pub enum PaperlibError {
    // ===== Identity Errors =====

    /// A call needs a signed-in user and there is no session
    #[error("{}", NOT_SIGNED_IN_MESSAGE)]
    NotSignedIn,

    /// The session exists but handing out an ID token failed
    #[error("{message}")]
    TokenFetch { message: String },

    /// Identity provider rejected an operation (e.g. `EMAIL_EXISTS`, `INVALID_PASSWORD`)
    #[error("Identity provider error: {code}")]
    Identity {
        /// Provider error code
        code: String,
        /// HTTP status code if available
        status_code: Option<u16>,
    },

    // ===== API Errors =====

    /// Request failed at the transport level or the server answered non-2xx
    #[error("{message}")]
    ApiRequestFailed {
        message: String,
        /// HTTP status code if available
        status_code: Option<u16>,
        /// API endpoint that failed
        endpoint: Option<String>,
        /// Structured server error body, if the server sent one
        body: Option<ErrorBody>,
    },

    /// API returned a body that does not match the expected shape
    #[error("Invalid API response: {message}")]
    InvalidApiResponse {
        message: String,
        /// Response body snippet for debugging
        response_body: Option<String>,
    },

    // ===== Input/Configuration Errors =====

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration is invalid or incomplete
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ===== General Errors =====

    /// Operation was cancelled by the caller
    #[error("Request cancelled")]
    Cancelled,

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One step of the user-message precedence chain.
type MessageExtractor = fn(&PaperlibError) -> Option<String>;

const MESSAGE_EXTRACTORS: [MessageExtractor; 3] = [server_message, server_detail, own_message];

fn error_body(error: &PaperlibError) -> Option<&ErrorBody> {
    match error {
        PaperlibError::ApiRequestFailed { body, .. } => body.as_ref(),
        _ => None,
    }
}

fn server_message(error: &PaperlibError) -> Option<String> {
    error_body(error)?.message.clone()
}

fn server_detail(error: &PaperlibError) -> Option<String> {
    error_body(error)?.detail_text()
}

fn own_message(error: &PaperlibError) -> Option<String> {
    Some(error.to_string())
}

// Helper methods for creating common errors
impl PaperlibError {
    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        PaperlibError::InvalidInput(message.into())
    }

    /// Create an InvalidConfiguration error with a message
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        PaperlibError::InvalidConfiguration(message.into())
    }

    /// Create a TokenFetch error
    pub fn token_fetch<S: Into<String>>(message: S) -> Self {
        PaperlibError::TokenFetch {
            message: message.into(),
        }
    }

    /// Create an ApiRequestFailed error
    pub fn api_failed<S: Into<String>>(
        message: S,
        status_code: Option<u16>,
        endpoint: Option<String>,
        body: Option<ErrorBody>,
    ) -> Self {
        PaperlibError::ApiRequestFailed {
            message: message.into(),
            status_code,
            endpoint,
            body,
        }
    }

    /// Create a transport failure that never reached a server response
    pub fn network_error<S: Into<String>>(message: S, endpoint: Option<String>) -> Self {
        Self::api_failed(message, None, endpoint, None)
    }

    /// Check if the error is an intentional cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PaperlibError::Cancelled)
    }

    /// HTTP status code attached to the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PaperlibError::ApiRequestFailed { status_code, .. }
            | PaperlibError::Identity { status_code, .. } => *status_code,
            PaperlibError::ReqwestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get user-friendly error message suitable for display
    ///
    /// Tries the server's `message`, then the server's `detail`, then the error's
    /// own text; empty candidates are skipped. Falls back to
    /// [`FALLBACK_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        MESSAGE_EXTRACTORS
            .iter()
            .filter_map(|extract| extract(self))
            .find(|message| !message.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failed(message: &str, body: Option<Value>) -> PaperlibError {
        PaperlibError::api_failed(
            message,
            Some(400),
            Some("/libraries".to_string()),
            body.as_ref().and_then(ErrorBody::from_value),
        )
    }

    #[test]
    fn test_server_message_wins() {
        let err = failed(
            "Request failed with status code 400",
            Some(json!({ "message": "X", "detail": "Y" })),
        );
        assert_eq!(err.user_message(), "X");
    }

    #[test]
    fn test_detail_used_when_message_missing() {
        let err = failed("Request failed with status code 404", Some(json!({ "detail": "Library not found" })));
        assert_eq!(err.user_message(), "Library not found");
    }

    #[test]
    fn test_validation_detail_is_flattened() {
        let err = failed(
            "Request failed with status code 422",
            Some(json!({
                "detail": [
                    { "loc": ["body", "title"], "msg": "field required", "type": "missing" },
                    { "loc": ["body", "private"], "msg": "value is not a valid boolean", "type": "bool" }
                ]
            })),
        );
        assert_eq!(err.user_message(), "field required; value is not a valid boolean");
    }

    #[test]
    fn test_empty_server_fields_are_skipped() {
        let err = failed("Request failed with status code 500", Some(json!({ "message": "", "detail": {} })));
        assert_eq!(err.user_message(), "Request failed with status code 500");
    }

    #[test]
    fn test_network_error_uses_own_message() {
        let err = PaperlibError::network_error("Network Error", None);
        assert_eq!(err.user_message(), "Network Error");
    }

    #[test]
    fn test_fallback_message() {
        let err = PaperlibError::network_error("   ", None);
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_non_object_body_is_ignored() {
        assert!(ErrorBody::from_value(&json!("Internal Server Error")).is_none());
        assert!(ErrorBody::from_value(&Value::Null).is_none());
    }

    #[test]
    fn test_malformed_message_does_not_hide_detail() {
        let body = ErrorBody::from_value(&json!({ "message": 42, "detail": "Library not found" }))
            .expect("object body should parse");
        assert!(body.message.is_none());
        assert_eq!(body.detail_text().as_deref(), Some("Library not found"));

        let err = failed(
            "Request failed with status code 404",
            Some(json!({ "message": 42, "detail": "Library not found" })),
        );
        assert_eq!(err.user_message(), "Library not found");
    }

    #[test]
    fn test_token_fetch_keeps_inner_message() {
        let err = PaperlibError::token_fetch("Network Error");
        assert_eq!(err.to_string(), "Network Error");
        assert_eq!(err.user_message(), "Network Error");
    }

    #[test]
    fn test_error_categorization() {
        assert!(PaperlibError::Cancelled.is_cancelled());
        assert!(!PaperlibError::NotSignedIn.is_cancelled());
        assert_eq!(failed("x", None).status_code(), Some(400));

        let forbidden = PaperlibError::api_failed("forbidden", Some(403), None, None);
        assert_eq!(forbidden.status_code(), Some(403));
    }
}
