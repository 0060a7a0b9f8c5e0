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


//! User notifications
//!
//! The API client reports outcomes as toast-style messages instead of returning
//! errors to its caller. A [`Notifier`] receives those messages; what it does with
//! them (render a toast, log, forward to another task) is up to the host.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Default time a notification stays visible
pub const DEFAULT_NOTIFICATION_LIFE: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    /// Summary line shown above the detail text
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
        }
    }
}

/// A single user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// How long the message stays visible
    pub life: Duration,
}

impl Notification {
    pub fn new<S: Into<String>>(severity: Severity, detail: S, life: Duration) -> Self {
        Self {
            severity,
            summary: severity.summary().to_string(),
            detail: detail.into(),
            life,
        }
    }

    pub fn success<S: Into<String>>(detail: S, life: Duration) -> Self {
        Self::new(Severity::Success, detail, life)
    }

    pub fn error<S: Into<String>>(detail: S, life: Duration) -> Self {
        Self::new(Severity::Error, detail, life)
    }
}

/// Consumer of outcome notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => tracing::info!(
                summary = %notification.summary,
                "{}",
                notification.detail
            ),
            Severity::Error => tracing::error!(
                summary = %notification.summary,
                "{}",
                notification.detail
            ),
        }
    }
}

/// Forwards notifications over an unbounded channel.
///
/// Lets a UI drain toasts on its own task. Notifications sent after the receiver
/// is gone are dropped.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification receiver dropped, discarding notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_follows_severity() {
        let ok = Notification::success("Library created", DEFAULT_NOTIFICATION_LIFE);
        assert_eq!(ok.summary, "Success");
        assert_eq!(ok.life, Duration::from_secs(5));

        let err = Notification::error("Network Error", DEFAULT_NOTIFICATION_LIFE);
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.summary, "Error");
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
    }

    #[tokio::test]
    async fn test_channel_notifier_forwards() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::error("boom", DEFAULT_NOTIFICATION_LIFE));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.detail, "boom");
    }

    #[test]
    fn test_channel_notifier_survives_dropped_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::success("ignored", DEFAULT_NOTIFICATION_LIFE));
    }
}
