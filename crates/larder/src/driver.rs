//! Tokio integration for [`Combobox`].
//!
//! This module requires the `tokio` feature:
//!
//! ```toml
//! [dependencies]
//! larder = { version = "0.3", features = ["tokio"] }
//! ```
//!
//! [`ComboboxDriver`] owns a combobox behind a mutex, stamps every event with
//! the tokio clock, spawns issued searches on the runtime and, through
//! [`ComboboxDriver::run_timers`], sleeps until the next debounce or close
//! deadline.
//!
//! Slots connected to the combobox's signals run after the mutex is
//! released, so they may call back into the driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::combobox::{Combobox, ComboboxView};
use crate::fetch::CandidateFetcher;
use crate::search::{GuardOutcome, SearchTask};
use crate::selection::SelectionEvent;

/// Drives a [`Combobox`] on the tokio runtime.
///
/// Cloning yields another handle onto the same combobox.
pub struct ComboboxDriver<F> {
    inner: Arc<Mutex<Combobox<F>>>,
    wake: Arc<Notify>,
    stopped: Arc<AtomicBool>,
}

impl<F> Clone for ComboboxDriver<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            wake: self.wake.clone(),
            stopped: self.stopped.clone(),
        }
    }
}

impl<F: CandidateFetcher + 'static> ComboboxDriver<F> {
    pub fn new(combobox: Combobox<F>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(combobox)),
            wake: Arc::new(Notify::new()),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Feed an event. A search started by the event is spawned and its
    /// handle returned.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, event: SelectionEvent) -> Option<JoinHandle<GuardOutcome>> {
        let deferred = self
            .inner
            .lock()
            .handle_event_deferred(event, Instant::now().into_std());
        self.wake.notify_one();
        deferred.finish().map(spawn_search)
    }

    /// Synchronise with the externally bound value.
    pub fn set_value(&self, id: &str) -> bool {
        self.inner.lock().set_value(id)
    }

    /// Run `f` with the combobox locked. Do not block inside `f`, and do not
    /// call back into the driver from it.
    pub fn with<R>(&self, f: impl FnOnce(&mut Combobox<F>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// A rendering snapshot.
    pub fn view(&self) -> ComboboxView {
        self.inner.lock().view()
    }

    /// Fire timers as their deadlines pass until [`stop`](Self::stop) is
    /// called. Spawn this once per combobox.
    pub async fn run_timers(&self) {
        while !self.stopped.load(Ordering::SeqCst) {
            let deadline = self.inner.lock().next_deadline();

            let Some(deadline) = deadline else {
                self.wake.notified().await;
                continue;
            };

            tokio::select! {
                _ = tokio::time::sleep_until(Instant::from_std(deadline)) => {
                    let deferred = self
                        .inner
                        .lock()
                        .poll_timers_deferred(Instant::now().into_std());
                    if let Some(task) = deferred.finish() {
                        spawn_search(task);
                    }
                }
                _ = self.wake.notified() => {}
            }
        }
        tracing::debug!(target: "larder::search", "timer loop stopped");
    }

    /// Unmount the combobox and end [`run_timers`](Self::run_timers).
    pub fn stop(&self) {
        self.inner.lock().unmount();
        self.stopped.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

fn spawn_search(task: SearchTask) -> JoinHandle<GuardOutcome> {
    tracing::trace!(target: "larder::search", epoch = task.epoch(), query = task.query(), "spawning search");
    tokio::spawn(task)
}

impl<F> std::fmt::Debug for ComboboxDriver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComboboxDriver")
            .field("stopped", &self.stopped.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
