//! The searchable combobox controller.
//!
//! [`Combobox`] wires a [`SelectionMachine`] to a [`SearchScheduler`], a
//! close grace timer and an [`AsyncResultGuard`]. It is sans-IO: the host
//! passes the current instant with every call, polls timers when
//! [`Combobox::next_deadline`] passes and drives any returned
//! [`SearchTask`] on its executor of choice.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! use futures_util::FutureExt;
//! use larder::fetch::fetcher_fn;
//! use larder::notify::TracingNotifier;
//! use larder::{Candidate, Combobox, ComboboxConfig, FetchResponse, Key, SelectionEvent};
//!
//! let fetcher = Arc::new(fetcher_fn(|_| async {
//!     Ok(FetchResponse::success(vec![Candidate::new("42", "SKU-1", "Rice 5kg")]))
//! }));
//! let mut combobox = Combobox::new(fetcher, Arc::new(TracingNotifier), ComboboxConfig::default());
//! combobox.value_changed.connect(|id: &String| println!("value: {id}"));
//!
//! let now = Instant::now();
//! let task = combobox.handle_event(SelectionEvent::Focus, now).expect("default load");
//! task.now_or_never();
//!
//! combobox.handle_event(SelectionEvent::KeyDown(Key::ArrowDown), now);
//! combobox.handle_event(SelectionEvent::KeyDown(Key::Enter), now);
//! assert_eq!(combobox.display_text(), "SKU-1 - Rice 5kg");
//! ```

use std::sync::Arc;
use std::time::Instant;

use larder_core::{QueuedEmission, Signal, SingleShot};

use crate::candidate::{Candidate, CandidateKind, CandidateList};
use crate::config::ComboboxConfig;
use crate::fetch::CandidateFetcher;
use crate::notify::Notifier;
use crate::search::{AsyncResultGuard, SearchScheduler, SearchSession, SearchTask};
use crate::selection::{SelectionEffect, SelectionEvent, SelectionMachine};

// ============================================================================
// View
// ============================================================================

/// What the dropdown shows below the input.
#[derive(Debug, Clone, PartialEq)]
pub enum DropdownBody {
    /// The dropdown is closed.
    Hidden,
    /// A fetch is outstanding.
    Loading,
    /// The list is empty. `searching` is true when a query was typed.
    Empty { searching: bool, message: String },
    /// Rows to render, in response order.
    Candidates(Arc<CandidateList>),
}

/// A read-only snapshot for rendering a combobox.
#[derive(Debug, Clone, PartialEq)]
pub struct ComboboxView {
    pub display_text: String,
    pub placeholder: String,
    pub is_open: bool,
    /// Highlighted row, `-1` for none.
    pub highlighted_index: i32,
    pub body: DropdownBody,
}

/// The result of a combobox call whose signal emissions are held back.
///
/// Call [`finish`](Self::finish) once any lock around the combobox is
/// released, so connected slots may read the combobox again.
#[must_use = "held-back emissions do nothing unless finished"]
#[derive(Debug)]
pub struct Deferred<T> {
    value: T,
    emissions: Vec<QueuedEmission>,
}

impl<T> Deferred<T> {
    /// Whether finishing will run any slots.
    pub fn has_emissions(&self) -> bool {
        self.emissions.iter().any(|e| e.slot_count() > 0)
    }

    /// Run the held-back emissions in order and return the value.
    pub fn finish(self) -> T {
        for emission in self.emissions {
            emission.invoke();
        }
        self.value
    }
}

// ============================================================================
// Combobox
// ============================================================================

/// One searchable combobox bound to an external value.
pub struct Combobox<F> {
    config: ComboboxConfig,
    machine: SelectionMachine,
    scheduler: SearchScheduler,
    close_grace: SingleShot,
    guard: AsyncResultGuard<F>,

    /// Emitted with the committed id, or `""` when the selection is cleared.
    pub value_changed: Signal<String>,
    /// Emitted with the committed candidate, or `None` when cleared.
    pub candidate_committed: Signal<Option<Candidate>>,
}

impl<F: CandidateFetcher + 'static> Combobox<F> {
    /// Create a closed combobox with nothing loaded.
    pub fn new(fetcher: Arc<F>, notifier: Arc<dyn Notifier>, config: ComboboxConfig) -> Self {
        let guard = AsyncResultGuard::new(fetcher, notifier)
            .with_kind(config.kind)
            .with_page(config.fetch_page, config.fetch_page_size);

        Self {
            machine: SelectionMachine::new(),
            scheduler: SearchScheduler::new(config.quiet_period()),
            close_grace: SingleShot::new(config.close_grace()),
            guard,
            config,
            value_changed: Signal::new(),
            candidate_committed: Signal::new(),
        }
    }

    /// Feed an input event. Returns a fetch to drive if the event started
    /// one immediately.
    pub fn handle_event(&mut self, event: SelectionEvent, now: Instant) -> Option<SearchTask> {
        self.handle_event_deferred(event, now).finish()
    }

    /// [`handle_event`](Self::handle_event) with `value_changed` and
    /// `candidate_committed` held back until the result is finished.
    pub fn handle_event_deferred(
        &mut self,
        event: SelectionEvent,
        now: Instant,
    ) -> Deferred<Option<SearchTask>> {
        let list = self.guard.candidates();
        let effects = self.machine.handle(event, &list);
        self.apply(effects, &list, now)
    }

    /// Fire any timers due at `now`. Returns a fetch to drive if the debounce
    /// quiet period ended.
    pub fn poll_timers(&mut self, now: Instant) -> Option<SearchTask> {
        self.poll_timers_deferred(now).finish()
    }

    /// [`poll_timers`](Self::poll_timers) with signal emissions held back.
    pub fn poll_timers_deferred(&mut self, now: Instant) -> Deferred<Option<SearchTask>> {
        let mut emissions = Vec::new();
        if self.close_grace.poll(now) {
            let list = self.guard.candidates();
            let effects = self.machine.handle(SelectionEvent::CloseGraceElapsed, &list);
            emissions = self.apply(effects, &list, now).emissions;
        }

        let value = self
            .scheduler
            .poll_expired(now)
            .map(|query| self.guard.issue(&query));
        Deferred { value, emissions }
    }

    /// The earliest instant at which [`poll_timers`](Self::poll_timers) has
    /// work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scheduler.deadline(), self.close_grace.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Synchronise with the externally bound value. Does not emit
    /// `value_changed`. Returns `true` if the selection changed now.
    ///
    /// An id missing from the current list is held and selected as soon as a
    /// loaded list contains it.
    pub fn set_value(&mut self, id: &str) -> bool {
        let list = self.guard.candidates();
        self.machine.sync_value(id, &list)
    }

    /// Cancel pending timers and disconnect all slots.
    pub fn unmount(&mut self) {
        self.scheduler.cancel();
        self.close_grace.cancel();
        self.value_changed.disconnect_all();
        self.candidate_committed.disconnect_all();
        tracing::debug!(target: "larder::selection", kind = ?self.config.kind, "combobox unmounted");
    }

    fn apply(
        &mut self,
        effects: Vec<SelectionEffect>,
        list: &CandidateList,
        now: Instant,
    ) -> Deferred<Option<SearchTask>> {
        let mut task = None;
        let mut emissions = Vec::new();

        for effect in effects {
            match effect {
                SelectionEffect::LoadDefault => {
                    if !list.has_loaded() && !self.guard.is_loading() {
                        self.scheduler.cancel();
                        task = Some(self.guard.issue(""));
                    }
                }
                SelectionEffect::ScheduleSearch(query) => self.scheduler.trigger_search(&query, now),
                SelectionEffect::CancelSearch => {
                    self.scheduler.cancel();
                }
                SelectionEffect::ScheduleClose => self.close_grace.restart(now),
                SelectionEffect::CancelClose => {
                    self.close_grace.cancel();
                }
                SelectionEffect::Committed(candidate) => {
                    emissions.push(self.value_changed.emit_queued(candidate.id.clone()));
                    emissions.push(self.candidate_committed.emit_queued(Some(candidate)));
                }
                SelectionEffect::Cleared => {
                    emissions.push(self.value_changed.emit_queued(String::new()));
                    emissions.push(self.candidate_committed.emit_queued(None));
                }
            }
        }

        Deferred {
            value: task,
            emissions,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// A rendering snapshot.
    pub fn view(&self) -> ComboboxView {
        let list = self.guard.candidates();
        let is_open = self.machine.is_open();
        let query = self.machine.query_text();

        let body = if !is_open {
            DropdownBody::Hidden
        } else if self.guard.is_loading() {
            DropdownBody::Loading
        } else if list.is_empty() {
            DropdownBody::Empty {
                searching: !query.is_empty(),
                message: self.config.kind.empty_message(query),
            }
        } else {
            DropdownBody::Candidates(list.clone())
        };

        ComboboxView {
            display_text: self.display_text(),
            placeholder: self.config.kind.placeholder(),
            is_open,
            highlighted_index: self.machine.highlighted_index(&list),
            body,
        }
    }

    pub fn config(&self) -> &ComboboxConfig {
        &self.config
    }

    pub fn kind(&self) -> CandidateKind {
        self.config.kind
    }

    /// The current candidate list.
    pub fn candidates(&self) -> Arc<CandidateList> {
        self.guard.candidates()
    }

    /// A snapshot of the search session.
    pub fn session(&self) -> SearchSession {
        self.guard.session()
    }

    /// The committed candidate, or the held bound value once the current
    /// list contains it.
    pub fn selected(&self) -> Option<Candidate> {
        let list = self.guard.candidates();
        self.machine
            .pending_match(&list)
            .or(self.machine.selected())
            .cloned()
    }

    /// Text shown in the input.
    pub fn display_text(&self) -> String {
        let list = self.guard.candidates();
        match self.machine.pending_match(&list) {
            Some(candidate) => candidate.display_text(),
            None => self.machine.display_text().to_owned(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.machine.is_open()
    }

    /// Highlighted row of the current list, `-1` for none.
    pub fn highlighted_index(&self) -> i32 {
        self.machine.highlighted_index(&self.guard.candidates())
    }

    /// Whether a debounced search is waiting to fire.
    pub fn search_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Whether a blur is waiting to close the dropdown.
    pub fn close_pending(&self) -> bool {
        self.close_grace.is_pending()
    }
}

impl<F> std::fmt::Debug for Combobox<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combobox")
            .field("config", &self.config)
            .field("machine", &self.machine)
            .field("scheduler", &self.scheduler)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
