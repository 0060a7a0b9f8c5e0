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


//! Client configuration
//!
//! [`ClientConfig`] controls where requests go and how outcomes are reported.
//! [`FirebaseConfig`] carries the web SDK settings of the identity project.
//!
//! # Environment
//! | Variable | Default |
//! |---|---|
//! | `PAPERLIB_API_URL` | `http://localhost:8000` |
//! | `PAPERLIB_TIMEOUT_SECS` | `30` |
//! | `PAPERLIB_NOTIFICATION_LIFE_MS` | `5000` |
//! | `PAPERLIB_NOTIFY_ON_CANCEL` | `false` |
//! | `FIREBASE_API_KEY` | required for [`FirebaseConfig::from_env`] |

use crate::error::{PaperlibError, Result};
use crate::notify::DEFAULT_NOTIFICATION_LIFE;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every route path is appended to
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// How long success/error notifications stay visible
    pub notification_life: Duration,
    /// Whether an intentional abort produces an error notification
    pub notify_on_cancel: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("paperlib-core/{}", env!("CARGO_PKG_VERSION")),
            notification_life: DEFAULT_NOTIFICATION_LIFE,
            notify_on_cancel: false,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Load configuration from `PAPERLIB_*` environment variables
    ///
    /// Unset variables fall back to the defaults.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if a variable is set but cannot be parsed,
    /// or if the resulting base URL is invalid.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            base_url: load("PAPERLIB_API_URL", defaults.base_url)?,
            timeout: Duration::from_secs(load("PAPERLIB_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            user_agent: defaults.user_agent,
            notification_life: Duration::from_millis(load(
                "PAPERLIB_NOTIFICATION_LIFE_MS",
                defaults.notification_life.as_millis() as u64,
            )?),
            notify_on_cancel: load("PAPERLIB_NOTIFY_ON_CANCEL", defaults.notify_on_cancel)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            PaperlibError::invalid_config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(PaperlibError::invalid_config(format!(
                "Unsupported base URL scheme '{other}'"
            ))),
        }
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn notification_life(mut self, life: Duration) -> Self {
        self.config.notification_life = life;
        self
    }

    pub fn notify_on_cancel(mut self, enable: bool) -> Self {
        self.config.notify_on_cancel = enable;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn load<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| PaperlibError::invalid_config(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

/// Firebase web SDK configuration
///
/// Matches the `firebase-config.json` shape exported by the Firebase console.
/// Only `apiKey` is needed for the REST identity endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

impl FirebaseConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            auth_domain: None,
            project_id: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
        }
    }

    /// Read a `firebase-config.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading Firebase config from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from `FIREBASE_API_KEY`
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("FIREBASE_API_KEY")
            .map_err(|_| PaperlibError::invalid_config("FIREBASE_API_KEY is not set"))?;
        let config = Self::new(api_key);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(PaperlibError::invalid_config("Firebase apiKey is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::builder()
            .base_url("https://api.example.org")
            .timeout(Duration::from_secs(60))
            .user_agent("TestAgent/1.0")
            .notification_life(Duration::from_millis(1500))
            .notify_on_cancel(true)
            .build();

        assert_eq!(config.base_url, "https://api.example.org");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "TestAgent/1.0");
        assert_eq!(config.notification_life, Duration::from_millis(1500));
        assert!(config.notify_on_cancel);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.notification_life, Duration::from_secs(5));
        assert!(!config.notify_on_cancel);
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let relative = ClientConfig::builder().base_url("/api").build();
        assert!(matches!(
            relative.validate(),
            Err(PaperlibError::InvalidConfiguration(_))
        ));

        let ftp = ClientConfig::builder().base_url("ftp://files.example.org").build();
        assert!(ftp.validate().is_err());
    }

    #[test]
    fn test_firebase_config_parses_console_export() {
        let raw = r#"{
            "apiKey": "AIzaTest",
            "authDomain": "paperlib.firebaseapp.com",
            "projectId": "paperlib",
            "storageBucket": "paperlib.appspot.com",
            "messagingSenderId": "1234",
            "appId": "1:1234:web:abcd"
        }"#;

        let config: FirebaseConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.api_key, "AIzaTest");
        assert_eq!(config.project_id.as_deref(), Some("paperlib"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_firebase_config_requires_api_key() {
        assert!(FirebaseConfig::new("  ").validate().is_err());
    }
}
