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


//! Authenticated API client
//!
//! An [`ApiClient`] is bound to one route and turns `get`/`post`/`put`/`patch`/
//! `delete` calls into authorized HTTP requests. It never returns errors to its
//! caller: every failure is reported through the [`Notifier`] and the call yields
//! `None`.
//!
//! # Call pipeline
//! 1. mark the client as loading
//! 2. resolve the bearer token (skipped for public routes)
//! 3. stop without a request if a token is required and there is no session
//! 4. build the [`RequestDescriptor`] (route path, headers, body, cancel signal)
//! 5. execute
//! 6. on success, notify the success message if one was given and return the body
//! 7. on failure, notify [`PaperlibError::user_message`] and return `None`
//! 8. clear the loading mark, on every exit path
//!
//! # Cancellation
//! Each call takes its own signal. [`ApiClient::abort`] cancels **every** call of
//! that client currently in flight; calls started afterwards are unaffected.
//! An aborted call yields `None` without an error toast unless
//! [`ClientConfig::notify_on_cancel`] is set.
//!
//! # Example
//! ```rust,no_run
//! use paperlib_core::api::{routes, ApiContext, RequestConfig, StaticTokenIdentity};
//! use paperlib_core::api::types::Library;
//! use paperlib_core::config::ClientConfig;
//! use paperlib_core::notify::TracingNotifier;
//! use std::sync::Arc;
//!
//! # async fn example() -> paperlib_core::error::Result<()> {
//! let context = ApiContext::new(
//!     ClientConfig::default(),
//!     Arc::new(StaticTokenIdentity::signed_in("uid", "id-token")),
//!     Arc::new(TracingNotifier),
//! )?;
//!
//! let library = context.bind(routes::libraries::get::user_library);
//! let found: Option<Library> = library.get(RequestConfig::new().param("42")).await;
//! # Ok(())
//! # }
//! ```

use crate::api::auth::{AuthToken, AuthTokenProvider, IdentityProvider};
use crate::api::cancel::{CancelController, CancelSignal};
use crate::api::routes::RouteFn;
use crate::api::transport::{HttpExecutor, RequestDescriptor, RequestExecutor};
use crate::api::types::Pagination;
use crate::config::ClientConfig;
use crate::error::{PaperlibError, Result};
use crate::notify::{Notification, Notifier};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Shared collaborators of all API clients of one application
///
/// Cheap to clone. Bind a route with [`ApiContext::bind`] (signed-in calls) or
/// [`ApiContext::bind_public`] (no session needed).
#[derive(Clone)]
pub struct ApiContext {
    executor: Arc<dyn RequestExecutor>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    config: Arc<ClientConfig>,
}

impl ApiContext {
    /// Create a context that talks HTTP through reqwest
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be built
    pub fn new(
        config: ClientConfig,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let executor = Arc::new(HttpExecutor::new(&config)?);
        Ok(Self::with_executor(config, executor, identity, notifier))
    }

    /// Create a context around a custom executor
    pub fn with_executor(
        config: ClientConfig,
        executor: Arc<dyn RequestExecutor>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            executor,
            identity,
            notifier,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Bind a route that requires a signed-in user
    pub fn bind<R: RouteFn>(&self, route: R) -> ApiClient<R> {
        ApiClient::new(self, route, false)
    }

    /// Bind a public route; no session is consulted and no token is sent
    pub fn bind_public<R: RouteFn>(&self, route: R) -> ApiClient<R> {
        ApiClient::new(self, route, true)
    }
}

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Positional parameters for the bound route
    pub route_params: Vec<String>,
    /// Shown as a success notification when the call succeeds
    pub success_message: Option<String>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param<S: Into<String>>(mut self, param: S) -> Self {
        self.route_params.push(param.into());
        self
    }

    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route_params.extend(params.into_iter().map(Into::into));
        self
    }

    pub fn success_message<S: Into<String>>(mut self, message: S) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add `offset` and `limit` query parameters
    pub fn pagination(self, pagination: Pagination) -> Self {
        self.query("offset", pagination.offset)
            .query("limit", pagination.limit)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// How a call ended
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    /// A session was required and there was none
    Unauthenticated,
    /// Aborted through [`ApiClient::abort`]
    Cancelled,
    /// Any other failure; the user has been notified
    Failed(PaperlibError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Keeps the in-flight count raised for the lifetime of one call
struct LoadingGuard<'a> {
    in_flight: &'a watch::Sender<usize>,
}

impl<'a> LoadingGuard<'a> {
    fn begin(in_flight: &'a watch::Sender<usize>) -> Self {
        in_flight.send_modify(|count| *count += 1);
        Self { in_flight }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// API client bound to a single route
pub struct ApiClient<R> {
    route: R,
    skip_auth: bool,
    tokens: AuthTokenProvider,
    executor: Arc<dyn RequestExecutor>,
    notifier: Arc<dyn Notifier>,
    notification_life: Duration,
    notify_on_cancel: bool,
    in_flight: watch::Sender<usize>,
    cancel: CancelController,
}

impl<R: RouteFn> ApiClient<R> {
    fn new(context: &ApiContext, route: R, skip_auth: bool) -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            route,
            skip_auth,
            tokens: AuthTokenProvider::new(
                Arc::clone(&context.identity),
                Arc::clone(&context.notifier),
                context.config.notification_life,
            ),
            executor: Arc::clone(&context.executor),
            notifier: Arc::clone(&context.notifier),
            notification_life: context.config.notification_life,
            notify_on_cancel: context.config.notify_on_cancel,
            in_flight,
            cancel: CancelController::new(),
        }
    }

    pub fn skip_auth(&self) -> bool {
        self.skip_auth
    }

    /// `true` while at least one call is in flight
    pub fn is_loading(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    /// Watch the number of calls in flight
    pub fn loading_changes(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }

    /// Cancel every call of this client that is currently in flight
    pub fn abort(&self) {
        debug!("aborting in-flight requests");
        self.cancel.abort();
    }

    pub async fn get<T: DeserializeOwned>(&self, config: RequestConfig) -> Option<T> {
        self.request::<T, ()>(Method::GET, None, config)
            .await
            .into_option()
    }

    pub async fn post<T, D>(&self, data: Option<&D>, config: RequestConfig) -> Option<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.request(Method::POST, data, config).await.into_option()
    }

    pub async fn put<T, D>(&self, data: Option<&D>, config: RequestConfig) -> Option<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.request(Method::PUT, data, config).await.into_option()
    }

    pub async fn patch<T, D>(&self, data: Option<&D>, config: RequestConfig) -> Option<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.request(Method::PATCH, data, config).await.into_option()
    }

    pub async fn delete<T: DeserializeOwned>(&self, config: RequestConfig) -> Option<T> {
        self.request::<T, ()>(Method::DELETE, None, config)
            .await
            .into_option()
    }

    /// Run one call and report how it ended
    ///
    /// The verb methods are thin wrappers around this.
    pub async fn request<T, D>(&self, method: Method, data: Option<&D>, config: RequestConfig) -> Outcome<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        let _loading = LoadingGuard::begin(&self.in_flight);

        let signal = self.cancel.signal();
        let mut abort = signal.clone();
        let success_message = config.success_message.clone();

        let result = tokio::select! {
            biased;
            _ = abort.cancelled() => Err(PaperlibError::Cancelled),
            result = self.dispatch(method, data, config, signal) => result,
        };

        self.settle(result, success_message)
    }

    async fn dispatch<T, D>(
        &self,
        method: Method,
        data: Option<&D>,
        config: RequestConfig,
        signal: CancelSignal,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        let token = self.tokens.get_token(self.skip_auth).await?;
        if token == AuthToken::Missing {
            return Err(PaperlibError::NotSignedIn);
        }

        let params: Vec<&str> = config.route_params.iter().map(String::as_str).collect();
        let url = self.route.path(&params);

        let mut headers = config.headers;
        match token.bearer() {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    PaperlibError::token_fetch(format!("token is not a valid header value: {e}"))
                })?;
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }

        let body = data
            .map(|d| serde_json::to_value(d))
            .transpose()
            .map_err(|e| PaperlibError::invalid_input(format!("Failed to serialize request body: {e}")))?;

        let request = RequestDescriptor {
            method,
            url,
            headers,
            query: config.query,
            body,
            timeout: config.timeout,
            signal,
        };

        debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.executor.execute(request).await?;

        serde_json::from_value(response.data.clone()).map_err(|e| {
            PaperlibError::InvalidApiResponse {
                message: format!("Unexpected response shape: {e}"),
                response_body: Some(response.data.to_string()),
            }
        })
    }

    fn settle<T>(&self, result: Result<T>, success_message: Option<String>) -> Outcome<T> {
        match result {
            Ok(value) => {
                if let Some(message) = success_message.filter(|m| !m.is_empty()) {
                    self.notifier
                        .notify(Notification::success(message, self.notification_life));
                }
                Outcome::Success(value)
            }
            // the token provider has already told the user
            Err(PaperlibError::NotSignedIn) => Outcome::Unauthenticated,
            Err(PaperlibError::Cancelled) => {
                debug!("request cancelled");
                if self.notify_on_cancel {
                    self.notifier.notify(Notification::error(
                        PaperlibError::Cancelled.user_message(),
                        self.notification_life,
                    ));
                }
                Outcome::Cancelled
            }
            Err(error) => {
                let message = error.user_message();
                warn!(error = %error, "request failed: {message}");
                self.notifier
                    .notify(Notification::error(message, self.notification_life));
                Outcome::Failed(error)
            }
        }
    }
}
