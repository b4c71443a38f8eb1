//! Debounced search scheduling.

use std::time::{Duration, Instant};

use larder_core::SingleShot;

/// Default quiet period between the last keystroke and the fetch.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Turns a stream of text changes into at most one fetch intent per quiet
/// period.
///
/// Each [`trigger_search`](Self::trigger_search) replaces the pending text
/// and restarts the timer, so only the trailing call within a quiet period
/// survives to [`poll_expired`](Self::poll_expired).
#[derive(Debug)]
pub struct SearchScheduler {
    timer: SingleShot,
    pending_query: Option<String>,
}

impl Default for SearchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl SearchScheduler {
    /// Create an idle scheduler with the given quiet period.
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            timer: SingleShot::new(quiet_period),
            pending_query: None,
        }
    }

    /// The configured quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.timer.duration()
    }

    /// Record `text` as the pending query and restart the quiet period.
    #[tracing::instrument(skip(self), target = "larder::search", level = "trace")]
    pub fn trigger_search(&mut self, text: &str, now: Instant) {
        self.pending_query = Some(text.to_owned());
        self.timer.restart(now);
    }

    /// Drop any pending search. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending_query = None;
        let cancelled = self.timer.cancel();
        if cancelled {
            tracing::trace!(target: "larder::search", "pending search cancelled");
        }
        cancelled
    }

    /// Whether a search is waiting for its quiet period to end.
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// When the pending search fires.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// The text that will be searched when the quiet period ends.
    pub fn pending_query(&self) -> Option<&str> {
        self.pending_query.as_deref()
    }

    /// Yield the pending query once its quiet period has elapsed at `now`.
    pub fn poll_expired(&mut self, now: Instant) -> Option<String> {
        if !self.timer.poll(now) {
            return None;
        }
        let query = self.pending_query.take()?;
        tracing::debug!(target: "larder::search", query = %query, "quiet period elapsed");
        Some(query)
    }
}
