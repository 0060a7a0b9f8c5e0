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


//! Bearer token acquisition
//!
//! The identity provider (Firebase in production) owns the session. The API
//! client only sees it through two traits:
//! - [`IdentityProvider`]: who is signed in right now, if anyone
//! - [`SessionUser`]: hands out an ID token for that user
//!
//! [`AuthTokenProvider`] sits between the two and the client. It never caches a
//! token itself; every call asks the session for one.

use crate::error::{PaperlibError, Result, NOT_SIGNED_IN_MESSAGE};
use crate::notify::{Notification, Notifier};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Signed-in user as seen by the API client
#[async_trait]
pub trait SessionUser: Send + Sync {
    /// Stable user id
    fn uid(&self) -> &str;

    /// Fresh ID token for the `Authorization` header
    async fn id_token(&self) -> Result<String>;
}

/// Source of the current session
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<Arc<dyn SessionUser>>;
}

/// Result of token resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthToken {
    /// Token for the `Authorization: Bearer` header
    Bearer(String),
    /// The route is public; no session was consulted
    Skipped,
    /// No session although one is required; the user has been notified
    Missing,
}

impl AuthToken {
    pub fn bearer(&self) -> Option<&str> {
        match self {
            Self::Bearer(token) => Some(token),
            _ => None,
        }
    }
}

/// Resolves bearer tokens for API calls
#[derive(Clone)]
pub struct AuthTokenProvider {
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    notification_life: Duration,
}

impl AuthTokenProvider {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        notification_life: Duration,
    ) -> Self {
        Self {
            identity,
            notifier,
            notification_life,
        }
    }

    /// Get a token for one call
    ///
    /// - `skip_auth`: returns [`AuthToken::Skipped`] without looking at the session
    /// - no session: notifies the user and returns [`AuthToken::Missing`]
    /// - otherwise asks the session for a fresh token
    ///
    /// # Errors
    /// Returns `TokenFetch` if the session fails to produce a (non-empty) token.
    pub async fn get_token(&self, skip_auth: bool) -> Result<AuthToken> {
        if skip_auth {
            return Ok(AuthToken::Skipped);
        }

        let Some(user) = self.identity.current_user() else {
            debug!("no signed-in user for an authenticated route");
            self.notifier.notify(Notification::error(
                NOT_SIGNED_IN_MESSAGE,
                self.notification_life,
            ));
            return Ok(AuthToken::Missing);
        };

        let token = user.id_token().await.map_err(|e| match e {
            PaperlibError::TokenFetch { .. } | PaperlibError::Cancelled => e,
            other => PaperlibError::token_fetch(other.user_message()),
        })?;

        if token.is_empty() {
            return Err(PaperlibError::token_fetch("identity provider returned an empty token"));
        }

        Ok(AuthToken::Bearer(token))
    }
}

/// Fixed token identity
///
/// Useful for scripts that already hold an ID token, and for hosts that manage
/// sessions elsewhere. `None` means nobody is signed in.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenIdentity {
    user: Option<Arc<StaticTokenUser>>,
}

#[derive(Debug)]
struct StaticTokenUser {
    uid: String,
    token: String,
}

impl StaticTokenIdentity {
    pub fn signed_in<U: Into<String>, T: Into<String>>(uid: U, token: T) -> Self {
        Self {
            user: Some(Arc::new(StaticTokenUser {
                uid: uid.into(),
                token: token.into(),
            })),
        }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl SessionUser for StaticTokenUser {
    fn uid(&self) -> &str {
        &self.uid
    }

    async fn id_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

impl IdentityProvider for StaticTokenIdentity {
    fn current_user(&self) -> Option<Arc<dyn SessionUser>> {
        self.user
            .as_ref()
            .map(|user| Arc::clone(user) as Arc<dyn SessionUser>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notification>>);

    impl Notifier for Recorder {
        fn notify(&self, notification: Notification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    /// Counts how often the session is consulted
    struct CountingIdentity {
        lookups: AtomicUsize,
        inner: StaticTokenIdentity,
    }

    impl IdentityProvider for CountingIdentity {
        fn current_user(&self) -> Option<Arc<dyn SessionUser>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.current_user()
        }
    }

    struct FailingUser;

    #[async_trait]
    impl SessionUser for FailingUser {
        fn uid(&self) -> &str {
            "broken"
        }

        async fn id_token(&self) -> Result<String> {
            Err(PaperlibError::network_error("Network Error", None))
        }
    }

    struct FailingIdentity;

    impl IdentityProvider for FailingIdentity {
        fn current_user(&self) -> Option<Arc<dyn SessionUser>> {
            Some(Arc::new(FailingUser))
        }
    }

    fn provider(identity: Arc<dyn IdentityProvider>, recorder: Arc<Recorder>) -> AuthTokenProvider {
        AuthTokenProvider::new(identity, recorder, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_skip_auth_never_consults_session() {
        let identity = Arc::new(CountingIdentity {
            lookups: AtomicUsize::new(0),
            inner: StaticTokenIdentity::signed_in("u1", "tok"),
        });
        let recorder = Arc::new(Recorder::default());
        let tokens = provider(identity.clone(), recorder.clone());

        assert_eq!(tokens.get_token(true).await.unwrap(), AuthToken::Skipped);
        assert_eq!(identity.lookups.load(Ordering::SeqCst), 0);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_session_notifies_once() {
        let recorder = Arc::new(Recorder::default());
        let tokens = provider(Arc::new(StaticTokenIdentity::signed_out()), recorder.clone());

        assert_eq!(tokens.get_token(false).await.unwrap(), AuthToken::Missing);

        let notes = recorder.0.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Error);
        assert_eq!(notes[0].detail, NOT_SIGNED_IN_MESSAGE);
    }

    #[tokio::test]
    async fn test_signed_in_returns_bearer() {
        let recorder = Arc::new(Recorder::default());
        let tokens = provider(
            Arc::new(StaticTokenIdentity::signed_in("u1", "abc")),
            recorder.clone(),
        );

        let token = tokens.get_token(false).await.unwrap();
        assert_eq!(token.bearer(), Some("abc"));
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_failure_is_token_fetch_error() {
        let recorder = Arc::new(Recorder::default());
        let tokens = provider(Arc::new(FailingIdentity), recorder.clone());

        let err = tokens.get_token(false).await.unwrap_err();
        assert!(matches!(err, PaperlibError::TokenFetch { .. }));
        assert_eq!(err.user_message(), "Network Error");
        // the client reports this failure, not the provider
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected() {
        let recorder = Arc::new(Recorder::default());
        let tokens = provider(Arc::new(StaticTokenIdentity::signed_in("u1", "")), recorder);

        assert!(matches!(
            tokens.get_token(false).await,
            Err(PaperlibError::TokenFetch { .. })
        ));
    }
}
