//! Graceful shutdown coordination utilities.
//!
//! Provides a lightweight [`ShutdownCoordinator`] shared across tasks so that
//! Ctrl+C or an overall execution deadline can stop the pipeline without
//! losing results that were already queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Shared handle to a shutdown coordinator.
pub type SharedShutdown = Arc<ShutdownCoordinator>;

/// Coordinates graceful shutdown across async tasks.
///
/// Every suspension point in the pipeline (token waits, backoff waits, retry
/// sleeps, queue sends) selects on [`ShutdownCoordinator::wait_for_shutdown`]
/// and exits promptly once the flag is set.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    is_shutdown: AtomicBool,
    notify: Notify,
}

impl ShutdownCoordinator {
    /// Create a new coordinator.
    pub fn new() -> Self {
        Self {
            is_shutdown: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Create a new shared coordinator wrapped in [`Arc`].
    pub fn shared() -> SharedShutdown {
        Arc::new(Self::new())
    }

    /// Request shutdown. Notifies all registered waiters exactly once.
    pub fn request_shutdown(&self) {
        if !self.is_shutdown.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Wait until shutdown is requested. Returns immediately if already set.
    pub async fn wait_for_shutdown(&self) {
        loop {
            if self.is_shutdown_requested() {
                return;
            }
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register interest before re-checking the flag so a
            // request_shutdown() between the check and the await cannot be
            // missed.
            notified.as_mut().enable();
            if self.is_shutdown_requested() {
                return;
            }
            notified.await;
        }
    }

    /// Request shutdown once `deadline` has elapsed.
    ///
    /// Bounds the overall run; combines with Ctrl+C into the single
    /// cancellation signal observed by every task.
    pub fn deadline(self: &Arc<Self>, deadline: Duration) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            if !this.is_shutdown_requested() {
                tracing::warn!(
                    deadline_secs = deadline.as_secs(),
                    "Execution deadline reached, shutting down"
                );
                this.request_shutdown();
            }
        });
    }
}
