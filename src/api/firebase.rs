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


//! Firebase email/password identity
//!
//! Talks to the Identity Toolkit and Secure Token REST APIs directly:
//! - `accounts:signUp`, `accounts:signInWithPassword`
//! - `accounts:sendOobCode` (verification email)
//! - `accounts:lookup` (account info, `emailVerified`)
//! - `token` (refresh an ID token)
//!
//! [`FirebaseSession`] is an [`IdentityProvider`]; its [`FirebaseUser`] hands out
//! ID tokens and refreshes them shortly before they expire.
//!
//! # Example
//! ```rust,no_run
//! use paperlib_core::api::firebase::{FirebaseAuth, FirebaseSession};
//! use paperlib_core::config::FirebaseConfig;
//!
//! # async fn example() -> paperlib_core::error::Result<()> {
//! let auth = FirebaseAuth::new(&FirebaseConfig::from_env()?)?;
//! let session = FirebaseSession::new(auth);
//! let user = session.sign_in("ada@example.org", "hunter2").await?;
//! println!("Logged in as {}", user.email().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::api::auth::{IdentityProvider, SessionUser};
use crate::api::transport::transport_error;
use crate::config::FirebaseConfig;
use crate::error::{PaperlibError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// ID tokens are refreshed once they are this close to expiry
const REFRESH_BUFFER_MINUTES: i64 = 5;

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    id_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdTokenRequest<'a> {
    id_token: &'a str,
}

/// Response of `signUp` and `signInWithPassword`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Response of the Secure Token `token` endpoint (snake_case, unlike the rest)
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

/// Account record returned by `accounts:lookup`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Freshly issued token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenGrant {
    fn issued_now(id_token: String, refresh_token: String, expires_in: &str) -> Result<Self> {
        let seconds: i64 = expires_in.trim().parse().map_err(|_| {
            PaperlibError::InvalidApiResponse {
                message: format!("expiresIn is not a number: {}", expires_in),
                response_body: None,
            }
        })?;
        Ok(Self {
            id_token,
            refresh_token,
            expires_at: Utc::now() + ChronoDuration::seconds(seconds),
        })
    }

    /// Expired or expiring within the refresh buffer
    pub fn needs_refresh(&self) -> bool {
        self.expires_at <= Utc::now() + ChronoDuration::minutes(REFRESH_BUFFER_MINUTES)
    }
}

// ============================================================================
// REST CLIENT
// ============================================================================

/// Firebase REST client for one project
#[derive(Debug, Clone)]
pub struct FirebaseAuth {
    client: Client,
    api_key: String,
    identity_toolkit_url: String,
    secure_token_url: String,
}

impl FirebaseAuth {
    /// # Errors
    /// Returns error if the config has no API key or the HTTP client cannot be built
    pub fn new(config: &FirebaseConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            identity_toolkit_url: IDENTITY_TOOLKIT_URL.to_string(),
            secure_token_url: SECURE_TOKEN_URL.to_string(),
        })
    }

    /// Point the client at other hosts (emulator, mock server)
    pub fn with_endpoints<A: Into<String>, B: Into<String>>(
        mut self,
        identity_toolkit_url: A,
        secure_token_url: B,
    ) -> Self {
        self.identity_toolkit_url = identity_toolkit_url.into().trim_end_matches('/').to_string();
        self.secure_token_url = secure_token_url.into().trim_end_matches('/').to_string();
        self
    }

    fn accounts_url(&self, action: &str) -> String {
        format!("{}/accounts:{}", self.identity_toolkit_url, action)
    }

    /// Create an email/password account
    ///
    /// # Errors
    /// `Identity` with e.g. `EMAIL_EXISTS`, `WEAK_PASSWORD`
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<FirebaseUser> {
        let response: PasswordResponse = self
            .call(
                "accounts:signUp",
                self.client.post(self.accounts_url("signUp")).json(&PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                }),
            )
            .await?;
        FirebaseUser::from_password_response(self.clone(), response)
    }

    /// Sign in with email and password
    ///
    /// # Errors
    /// `Identity` with e.g. `INVALID_LOGIN_CREDENTIALS`, `USER_DISABLED`
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<FirebaseUser> {
        let response: PasswordResponse = self
            .call(
                "accounts:signInWithPassword",
                self.client
                    .post(self.accounts_url("signInWithPassword"))
                    .json(&PasswordRequest {
                        email,
                        password,
                        return_secure_token: true,
                    }),
            )
            .await?;
        FirebaseUser::from_password_response(self.clone(), response)
    }

    /// Send the verification email for the account owning `id_token`
    pub async fn send_email_verification(&self, id_token: &str) -> Result<()> {
        let _: Value = self
            .call(
                "accounts:sendOobCode",
                self.client.post(self.accounts_url("sendOobCode")).json(&OobCodeRequest {
                    request_type: "VERIFY_EMAIL",
                    id_token,
                }),
            )
            .await?;
        Ok(())
    }

    /// Account info for the owner of `id_token`
    pub async fn lookup(&self, id_token: &str) -> Result<AccountInfo> {
        let response: LookupResponse = self
            .call(
                "accounts:lookup",
                self.client
                    .post(self.accounts_url("lookup"))
                    .json(&IdTokenRequest { id_token }),
            )
            .await?;

        response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| PaperlibError::InvalidApiResponse {
                message: "accounts:lookup returned no user".to_string(),
                response_body: None,
            })
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        let response: RefreshResponse = self
            .call(
                "token",
                self.client
                    .post(format!("{}/token", self.secure_token_url))
                    .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)]),
            )
            .await?;
        TokenGrant::issued_now(response.id_token, response.refresh_token, &response.expires_in)
    }

    async fn call<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> Result<T> {
        debug!(%endpoint, "calling Firebase");

        let response = request
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(e, endpoint))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, endpoint))?;

        if !status.is_success() {
            return Err(identity_error(status.as_u16(), &text, endpoint));
        }

        serde_json::from_str(&text).map_err(|e| PaperlibError::InvalidApiResponse {
            message: format!("{} returned unexpected JSON: {}", endpoint, e),
            response_body: Some(text.chars().take(200).collect()),
        })
    }
}

/// Map a Firebase error body (`{"error": {"message": "EMAIL_EXISTS"}}`) to an error
///
/// Messages may carry a description after the code (`"WEAK_PASSWORD : Password
/// should be at least 6 characters"`); only the code is kept.
fn identity_error(status: u16, body: &str, endpoint: &str) -> PaperlibError {
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
        .and_then(|message| {
            let code = message.split(" : ").next().unwrap_or_default().trim().to_string();
            (!code.is_empty()).then_some(code)
        });

    match code {
        Some(code) => PaperlibError::Identity {
            code,
            status_code: Some(status),
        },
        None => PaperlibError::api_failed(
            format!("Request failed with status code {}", status),
            Some(status),
            Some(endpoint.to_string()),
            None,
        ),
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Signed-in Firebase account
pub struct FirebaseUser {
    auth: FirebaseAuth,
    uid: String,
    email: Option<String>,
    tokens: Mutex<TokenGrant>,
}

impl std::fmt::Debug for FirebaseUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseUser")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl FirebaseUser {
    fn from_password_response(auth: FirebaseAuth, response: PasswordResponse) -> Result<Self> {
        let grant =
            TokenGrant::issued_now(response.id_token, response.refresh_token, &response.expires_in)?;
        Ok(Self {
            auth,
            uid: response.local_id,
            email: response.email,
            tokens: Mutex::new(grant),
        })
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Expiry of the current ID token
    pub async fn token_expires_at(&self) -> DateTime<Utc> {
        self.tokens.lock().await.expires_at
    }

    /// Force a token refresh regardless of expiry
    pub async fn refresh(&self) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        *tokens = self.auth.refresh(&tokens.refresh_token).await?;
        debug!(uid = %self.uid, "ID token refreshed");
        Ok(())
    }

    /// Whether the account's email address has been verified
    pub async fn email_verified(&self) -> Result<bool> {
        let token = self.id_token().await?;
        Ok(self.auth.lookup(&token).await?.email_verified)
    }

    pub async fn send_email_verification(&self) -> Result<()> {
        let token = self.id_token().await?;
        self.auth.send_email_verification(&token).await?;
        info!(uid = %self.uid, "verification email sent");
        Ok(())
    }
}

#[async_trait]
impl SessionUser for FirebaseUser {
    fn uid(&self) -> &str {
        &self.uid
    }

    async fn id_token(&self) -> Result<String> {
        let mut tokens = self.tokens.lock().await;
        if tokens.needs_refresh() {
            debug!(uid = %self.uid, "ID token near expiry, refreshing");
            *tokens = self.auth.refresh(&tokens.refresh_token).await?;
        }
        Ok(tokens.id_token.clone())
    }
}

/// Current Firebase session of the application
#[derive(Debug)]
pub struct FirebaseSession {
    auth: FirebaseAuth,
    current: RwLock<Option<Arc<FirebaseUser>>>,
}

impl FirebaseSession {
    pub fn new(auth: FirebaseAuth) -> Self {
        Self {
            auth,
            current: RwLock::new(None),
        }
    }

    pub fn auth(&self) -> &FirebaseAuth {
        &self.auth
    }

    /// Signed-in user, if any
    pub fn user(&self) -> Option<Arc<FirebaseUser>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, user: Option<Arc<FirebaseUser>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Sign in and make the account the current session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Arc<FirebaseUser>> {
        let user = Arc::new(self.auth.sign_in_with_password(email, password).await?);
        info!(uid = %user.uid, "signed in");
        self.replace(Some(Arc::clone(&user)));
        Ok(user)
    }

    /// Create an account and make it the current session
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Arc<FirebaseUser>> {
        let user = Arc::new(self.auth.sign_up(email, password).await?);
        info!(uid = %user.uid, "account created");
        self.replace(Some(Arc::clone(&user)));
        Ok(user)
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.user() {
            info!(uid = %user.uid, "signed out");
        }
        self.replace(None);
    }
}

impl IdentityProvider for FirebaseSession {
    fn current_user(&self) -> Option<Arc<dyn SessionUser>> {
        self.user().map(|user| user as Arc<dyn SessionUser>)
    }
}
