//! Timer system for Larder.
//!
//! Timers here are plain records in a queue. Nothing sleeps: the owner passes
//! the current [`Instant`] to every call and collects whichever timers have
//! expired. This keeps debounce and grace-period logic deterministic and lets
//! a host drive it from any event loop (or from a test with a synthetic clock).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, TimerError};

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer fires.
    deadline: Instant,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages a set of one-shot timers.
///
/// Stopped timers are removed from the slot map immediately; their queue
/// entries are discarded once they reach the front.
#[derive(Debug, Default)]
pub struct TimerManager {
    /// All pending timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn start_one_shot(&mut self, now: Instant, duration: Duration) -> TimerId {
        let deadline = now + duration;
        let id = self.timers.insert(TimerData { deadline });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: deadline,
        });
        tracing::trace!(target: "larder_core::timer", ?id, ?duration, "timer started");
        id
    }

    /// Stop and remove a timer.
    ///
    /// Returns an error if the timer already fired or was stopped before.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        match self.timers.remove(id) {
            Some(_) => {
                tracing::trace!(target: "larder_core::timer", ?id, "timer stopped");
                self.discard_stopped();
                Ok(())
            }
            None => Err(TimerError::InvalidTimerId.into()),
        }
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// The deadline of a pending timer.
    pub fn deadline(&self, id: TimerId) -> Option<Instant> {
        self.timers.get(id).map(|t| t.deadline)
    }

    /// The earliest deadline among pending timers, if any.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_stopped();
        self.queue.peek().map(|entry| entry.fire_time)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Remove and return every timer whose deadline is at or before `now`,
    /// in deadline order.
    #[tracing::instrument(skip(self), target = "larder_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            if self.timers.remove(entry.id).is_some() {
                tracing::trace!(target: "larder_core::timer", id = ?entry.id, "timer fired");
                fired.push(entry.id);
            }
        }

        fired
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Stop every pending timer.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    fn discard_stopped(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

/// A single restartable one-shot timer.
///
/// Restarting replaces the pending deadline, which is exactly the behaviour
/// of a debounce (restart on every input) or a grace period (restart on every
/// blur, cancel on focus).
#[derive(Debug)]
pub struct SingleShot {
    manager: TimerManager,
    current: Option<TimerId>,
    duration: Duration,
}

impl SingleShot {
    /// Create an idle timer with the given delay.
    pub fn new(duration: Duration) -> Self {
        Self {
            manager: TimerManager::new(),
            current: None,
            duration,
        }
    }

    /// The configured delay.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Cancel any pending deadline and start a fresh one from `now`.
    pub fn restart(&mut self, now: Instant) {
        self.cancel();
        self.current = Some(self.manager.start_one_shot(now, self.duration));
    }

    /// Cancel the pending deadline. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.current.take() {
            Some(id) => self.manager.stop(id).is_ok(),
            None => false,
        }
    }

    /// Whether a deadline is pending.
    pub fn is_pending(&self) -> bool {
        self.current.is_some_and(|id| self.manager.is_active(id))
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.current.and_then(|id| self.manager.deadline(id))
    }

    /// Returns `true` exactly once when the pending deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(id) = self.current else {
            return false;
        };
        let fired = self.manager.process_expired(now).contains(&id);
        if fired {
            self.current = None;
        }
        fired
    }
}
