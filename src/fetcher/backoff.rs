//! Process-wide cooperative backoff for rate-limit responses.
//!
//! The token bucket handles steady-state pacing; this controller handles
//! abrupt throttling signals. When any fetch task observes a rate-limit
//! response it arms a shared cool-down window, and every fetch task that
//! sees the armed state pauses until the window lapses.

use crate::shutdown::ShutdownCoordinator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Error returned when a backoff wait is interrupted by shutdown.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("cancelled while waiting for backoff release")]
pub struct BackoffCancelled;

/// Shared pause signal armed on rate-limit responses.
///
/// At most one cool-down window is in flight at a time; arming while already
/// active is a no-op. The window's expiry clears the flag and releases all
/// waiting tasks exactly once. A task that reads `is_active() == false` just
/// before a window is armed proceeds with at most one extra request and is
/// paused on its next attempt.
pub struct BackoffController {
    active: watch::Sender<bool>,
    window: Duration,
}

impl BackoffController {
    /// Create a controller with the given cool-down window length.
    pub fn new(window: Duration) -> Arc<Self> {
        let (active, _) = watch::channel(false);
        Arc::new(Self { active, window })
    }

    /// Arm the cool-down window if it is not already active.
    ///
    /// Only the caller that performs the inactive-to-active transition
    /// spawns the release timer; concurrent calls are idempotent no-ops.
    pub fn arm(self: &Arc<Self>) {
        let armed = self.active.send_if_modified(|active| {
            if *active {
                false
            } else {
                *active = true;
                true
            }
        });
        if !armed {
            return;
        }

        info!(window_secs = self.window.as_secs(), "Rate limit observed, pausing all fetch tasks");
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.window).await;
            this.active.send_replace(false);
            debug!("Backoff window lapsed, fetch tasks released");
        });
    }

    /// Non-blocking query of the armed state.
    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    /// Block until the active window lapses or shutdown is requested.
    ///
    /// Returns immediately if no window is active. The watch channel checks
    /// the current value before suspending, so a release that races with the
    /// caller's `is_active()` check cannot be missed.
    pub async fn await_release(
        &self,
        shutdown: &ShutdownCoordinator,
    ) -> Result<(), BackoffCancelled> {
        let mut released = self.active.subscribe();
        tokio::select! {
            result = released.wait_for(|active| !*active) => {
                // The sender lives in self, so the channel cannot close here.
                result.map(|_| ()).map_err(|_| BackoffCancelled)
            }
            () = shutdown.wait_for_shutdown() => Err(BackoffCancelled),
        }
    }
}
