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


//! Cooperative request cancellation
//!
//! A [`CancelController`] hands out one [`CancelSignal`] per request. Calling
//! [`CancelController::abort`] cancels every signal handed out so far and starts
//! a new generation, so requests issued afterwards start uncancelled.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Cancellation source owned by one API client
#[derive(Debug)]
pub struct CancelController {
    generation: Mutex<watch::Sender<bool>>,
}

impl CancelController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            generation: Mutex::new(tx),
        }
    }

    fn current(&self) -> MutexGuard<'_, watch::Sender<bool>> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Signal for a new request in the current generation
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.current().subscribe(),
        }
    }

    /// Cancel all outstanding signals
    ///
    /// A no-op when nothing is in flight; later signals are unaffected either way.
    pub fn abort(&self) {
        let mut current = self.current();
        current.send_replace(true);
        let (fresh, _) = watch::channel(false);
        *current = fresh;
    }
}

impl Default for CancelController {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation signal attached to one request
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Signal that is never cancelled
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal is cancelled
    ///
    /// Never resolves if the controller is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_abort_cancels_outstanding_signals() {
        let controller = CancelController::new();
        let mut first = controller.signal();
        let mut second = controller.signal();

        controller.abort();

        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), first.cancelled())
            .await
            .expect("first signal should resolve");
        tokio::time::timeout(Duration::from_secs(1), second.cancelled())
            .await
            .expect("second signal should resolve");
    }

    #[tokio::test]
    async fn test_abort_does_not_poison_later_signals() {
        let controller = CancelController::new();
        controller.abort();

        let mut later = controller.signal();
        assert!(!later.is_cancelled());

        let waited = tokio::time::timeout(Duration::from_millis(50), later.cancelled()).await;
        assert!(waited.is_err(), "fresh signal must not be cancelled");
    }

    #[tokio::test]
    async fn test_abort_wakes_waiting_task() {
        let controller = std::sync::Arc::new(CancelController::new());
        let mut signal = controller.signal();

        let waiter = tokio::spawn(async move {
            signal.cancelled().await;
        });

        tokio::task::yield_now().await;
        controller.abort();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_controller_does_not_cancel() {
        let controller = CancelController::new();
        let mut signal = controller.signal();
        drop(controller);

        assert!(!signal.is_cancelled());
        let waited = tokio::time::timeout(Duration::from_millis(50), signal.cancelled()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn test_never_signal() {
        assert!(!CancelSignal::never().is_cancelled());
    }
}
