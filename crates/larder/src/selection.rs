//! The combobox selection state machine.
//!
//! [`SelectionMachine`] is a pure reducer: it consumes discrete input events,
//! updates its own state and returns the [`SelectionEffect`]s the owner must
//! carry out (start a load, restart the debounce, report a value). It never
//! touches timers or the network itself.
//!
//! # States
//!
//! ```text
//!             focus / Enter / ArrowDown
//!   Closed ─────────────────────────────▶ Open(no highlight)
//!     ▲                                      │   ▲
//!     │ Escape, commit, grace elapsed        │   │ ArrowUp from 0
//!     │                                      ▼   │
//!     └────────────────────────────────── Open(highlighted i)
//! ```
//!
//! The highlight always refers to the candidate list the machine last saw.
//! When the list is replaced (its revision changes) the highlight resets.

use crate::candidate::{Candidate, CandidateList};

// ============================================================================
// Events and Effects
// ============================================================================

/// Keys the combobox reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    ArrowDown,
    ArrowUp,
    Escape,
}

/// An input event delivered to the combobox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// The text input gained focus.
    Focus,
    /// The text input lost focus.
    Blur,
    /// A key was pressed in the text input.
    KeyDown(Key),
    /// The pointer moved over candidate row `i`.
    PointerEnter(usize),
    /// Candidate row `i` was clicked.
    PointerClick(usize),
    /// The text input's content changed.
    InputChanged(String),
    /// The close grace period started by a blur has elapsed.
    CloseGraceElapsed,
}

/// Work the owner of a [`SelectionMachine`] must perform after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEffect {
    /// Fetch the default (empty query) candidate page without debouncing.
    LoadDefault,
    /// Restart the debounce with this query.
    ScheduleSearch(String),
    /// Drop any pending debounced search.
    CancelSearch,
    /// Start the close grace period.
    ScheduleClose,
    /// Cancel a pending close.
    CancelClose,
    /// A candidate was committed; report its id.
    Committed(Candidate),
    /// The selection was cleared; report an empty value.
    Cleared,
}

/// Whether the dropdown is open and which row is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    #[default]
    Closed,
    Open { highlighted: Option<usize> },
}

// ============================================================================
// Selection Machine
// ============================================================================

/// Tracks dropdown visibility, the highlighted row and the committed
/// selection of one combobox.
#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    phase: SelectionPhase,
    selected: Option<Candidate>,
    display_text: String,
    query_text: String,
    seen_revision: u64,
    /// A bound id not yet present in any list the machine has seen.
    pending_value: Option<String>,
}

impl SelectionMachine {
    /// Create a closed machine with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `event` against the current candidate list.
    #[tracing::instrument(skip(self, list), target = "larder::selection", level = "trace")]
    pub fn handle(&mut self, event: SelectionEvent, list: &CandidateList) -> Vec<SelectionEffect> {
        self.sync_revision(list);
        let mut effects = Vec::new();

        match event {
            SelectionEvent::Focus => {
                effects.push(SelectionEffect::CancelClose);
                if !self.is_open() {
                    self.open(&mut effects);
                }
            }
            SelectionEvent::Blur => {
                if self.is_open() {
                    effects.push(SelectionEffect::ScheduleClose);
                }
            }
            SelectionEvent::CloseGraceElapsed => self.close(),
            SelectionEvent::KeyDown(key) => self.handle_key(key, list, &mut effects),
            SelectionEvent::PointerEnter(index) => {
                if self.is_open() && index < list.len() {
                    self.phase = SelectionPhase::Open {
                        highlighted: Some(index),
                    };
                }
            }
            SelectionEvent::PointerClick(index) => {
                if !self.is_open() {
                    return effects;
                }
                match list.get(index) {
                    Some(candidate) => self.commit(candidate.clone(), &mut effects),
                    None => effects.push(SelectionEffect::CancelClose),
                }
            }
            SelectionEvent::InputChanged(text) => self.input_changed(text, &mut effects),
        }

        tracing::trace!(target: "larder::selection", phase = ?self.phase, ?effects, "event handled");
        effects
    }

    fn handle_key(&mut self, key: Key, list: &CandidateList, effects: &mut Vec<SelectionEffect>) {
        let SelectionPhase::Open { highlighted } = self.phase else {
            if matches!(key, Key::Enter | Key::ArrowDown) {
                self.open(effects);
            }
            return;
        };

        match key {
            Key::ArrowDown => {
                let next = match (highlighted, list.len()) {
                    (_, 0) => None,
                    (None, _) => Some(0),
                    (Some(i), len) => Some((i + 1).min(len - 1)),
                };
                self.phase = SelectionPhase::Open { highlighted: next };
            }
            Key::ArrowUp => {
                let next = match highlighted {
                    Some(i) if i > 0 => Some(i - 1),
                    _ => None,
                };
                self.phase = SelectionPhase::Open { highlighted: next };
            }
            Key::Enter => {
                if let Some(candidate) = highlighted.and_then(|i| list.get(i)) {
                    self.commit(candidate.clone(), effects);
                }
            }
            Key::Escape => self.close(),
        }
    }

    fn input_changed(&mut self, text: String, effects: &mut Vec<SelectionEffect>) {
        self.pending_value = None;
        if text.is_empty() {
            self.selected = None;
            effects.push(SelectionEffect::Cleared);
        }
        self.display_text.clone_from(&text);
        self.query_text.clone_from(&text);
        self.phase = SelectionPhase::Open { highlighted: None };
        effects.push(SelectionEffect::ScheduleSearch(text));
    }

    fn open(&mut self, effects: &mut Vec<SelectionEffect>) {
        self.phase = SelectionPhase::Open { highlighted: None };
        if self.query_text.is_empty() {
            effects.push(SelectionEffect::LoadDefault);
        }
    }

    fn close(&mut self) {
        self.phase = SelectionPhase::Closed;
    }

    fn commit(&mut self, candidate: Candidate, effects: &mut Vec<SelectionEffect>) {
        tracing::debug!(target: "larder::selection", id = %candidate.id, "candidate committed");
        self.pending_value = None;
        self.select(candidate.clone());
        self.close();
        effects.push(SelectionEffect::CancelSearch);
        effects.push(SelectionEffect::CancelClose);
        effects.push(SelectionEffect::Committed(candidate));
    }

    fn sync_revision(&mut self, list: &CandidateList) {
        if list.revision() == self.seen_revision {
            return;
        }
        self.seen_revision = list.revision();
        if self.is_open() {
            self.phase = SelectionPhase::Open { highlighted: None };
        }
        if let Some(candidate) = self.pending_match(list).cloned() {
            tracing::debug!(target: "larder::selection", id = %candidate.id, "bound value resolved");
            self.pending_value = None;
            self.select(candidate);
        }
    }

    fn select(&mut self, candidate: Candidate) {
        self.display_text = candidate.display_text();
        self.query_text.clone_from(&self.display_text);
        self.selected = Some(candidate);
    }

    /// Synchronise with an externally bound value without reporting it back.
    ///
    /// An empty `id` clears the selection. A non-empty `id` selects the
    /// matching candidate from `list`. An id not present in `list` leaves the
    /// selection unchanged and is held until a later list contains it.
    /// Returns `true` if the selection changed now.
    pub fn sync_value(&mut self, id: &str, list: &CandidateList) -> bool {
        self.sync_revision(list);
        self.pending_value = None;

        if id.is_empty() {
            if self.selected.is_none() && self.display_text.is_empty() {
                return false;
            }
            self.selected = None;
            self.display_text.clear();
            self.query_text.clear();
            return true;
        }

        if self.selected.as_ref().is_some_and(|c| c.id == id) {
            return false;
        }
        let Some(candidate) = list.find(id) else {
            tracing::debug!(target: "larder::selection", id, "bound value not loaded yet");
            self.pending_value = Some(id.to_owned());
            return false;
        };
        self.select(candidate.clone());
        true
    }

    /// The candidate in `list` matching a held bound value, if any.
    pub fn pending_match<'a>(&self, list: &'a CandidateList) -> Option<&'a Candidate> {
        self.pending_value.as_deref().and_then(|id| list.find(id))
    }

    /// A bound id waiting for a list that contains it.
    pub fn pending_value(&self) -> Option<&str> {
        self.pending_value.as_deref()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, SelectionPhase::Open { .. })
    }

    /// The committed candidate. Survives list replacement.
    pub fn selected(&self) -> Option<&Candidate> {
        self.selected.as_ref()
    }

    /// Text shown in the input.
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// Text that drives searches.
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// The highlighted row of `list`, if the dropdown is open and `list` is
    /// the list the highlight was made against.
    pub fn highlighted(&self, list: &CandidateList) -> Option<usize> {
        match self.phase {
            SelectionPhase::Open { highlighted } if list.revision() == self.seen_revision => {
                highlighted.filter(|&i| i < list.len())
            }
            _ => None,
        }
    }

    /// [`highlighted`](Self::highlighted) as an index, `-1` for none.
    pub fn highlighted_index(&self, list: &CandidateList) -> i32 {
        self.highlighted(list)
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> CandidateList {
        CandidateList::empty().replaced_by(vec![
            Candidate::new("1", "SKU-1", "Rice 5kg"),
            Candidate::new("2", "SKU-2", "Sugar 1kg"),
            Candidate::new("3", "SKU-3", "Salt"),
        ])
    }

    fn open_machine(list: &CandidateList) -> SelectionMachine {
        let mut machine = SelectionMachine::new();
        machine.handle(SelectionEvent::Focus, list);
        machine
    }

    #[test]
    fn test_focus_opens_and_requests_default_load() {
        let list = CandidateList::empty();
        let mut machine = SelectionMachine::new();

        let effects = machine.handle(SelectionEvent::Focus, &list);
        assert_eq!(
            effects,
            vec![SelectionEffect::CancelClose, SelectionEffect::LoadDefault]
        );
        assert_eq!(machine.phase(), SelectionPhase::Open { highlighted: None });
        assert_eq!(machine.highlighted_index(&list), -1);
    }

    #[test]
    fn test_arrow_down_stops_at_last() {
        let list = three();
        let mut machine = open_machine(&list);

        let mut seen = Vec::new();
        for _ in 0..4 {
            machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &list);
            seen.push(machine.highlighted_index(&list));
        }
        assert_eq!(seen, vec![0, 1, 2, 2]);
    }

    #[test]
    fn test_arrow_up_returns_to_none() {
        let list = three();
        let mut machine = open_machine(&list);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &list);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &list);

        machine.handle(SelectionEvent::KeyDown(Key::ArrowUp), &list);
        assert_eq!(machine.highlighted_index(&list), 0);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowUp), &list);
        assert_eq!(machine.highlighted_index(&list), -1);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowUp), &list);
        assert_eq!(machine.highlighted_index(&list), -1);
    }

    #[test]
    fn test_arrow_down_on_empty_list() {
        let list = CandidateList::empty().replaced_by(Vec::new());
        let mut machine = open_machine(&list);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &list);
        assert_eq!(machine.highlighted_index(&list), -1);
    }

    #[test]
    fn test_closed_keys_open() {
        let list = three();
        for key in [Key::Enter, Key::ArrowDown] {
            let mut machine = SelectionMachine::new();
            machine.handle(SelectionEvent::KeyDown(key), &list);
            assert_eq!(machine.phase(), SelectionPhase::Open { highlighted: None });
        }
        for key in [Key::ArrowUp, Key::Escape] {
            let mut machine = SelectionMachine::new();
            assert!(machine.handle(SelectionEvent::KeyDown(key), &list).is_empty());
            assert!(!machine.is_open());
        }
    }

    #[test]
    fn test_enter_commits_highlighted() {
        let list = three();
        let mut machine = open_machine(&list);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &list);

        let effects = machine.handle(SelectionEvent::KeyDown(Key::Enter), &list);
        assert_eq!(
            effects,
            vec![
                SelectionEffect::CancelSearch,
                SelectionEffect::CancelClose,
                SelectionEffect::Committed(Candidate::new("1", "SKU-1", "Rice 5kg")),
            ]
        );
        assert!(!machine.is_open());
        assert_eq!(machine.display_text(), "SKU-1 - Rice 5kg");
        assert_eq!(machine.selected().map(|c| c.id.as_str()), Some("1"));
    }

    #[test]
    fn test_enter_without_highlight_is_noop() {
        let list = three();
        let mut machine = open_machine(&list);
        assert!(machine.handle(SelectionEvent::KeyDown(Key::Enter), &list).is_empty());
        assert!(machine.is_open());
        assert!(machine.selected().is_none());
    }

    #[test]
    fn test_escape_preserves_selection() {
        let list = three();
        let mut machine = open_machine(&list);
        machine.handle(SelectionEvent::PointerClick(2), &list);
        machine.handle(SelectionEvent::Focus, &list);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &list);

        machine.handle(SelectionEvent::KeyDown(Key::Escape), &list);
        assert!(!machine.is_open());
        assert_eq!(machine.highlighted_index(&list), -1);
        assert_eq!(machine.selected().map(|c| c.id.as_str()), Some("3"));
    }

    #[test]
    fn test_pointer_hover_and_click() {
        let list = three();
        let mut machine = open_machine(&list);

        machine.handle(SelectionEvent::PointerEnter(1), &list);
        assert_eq!(machine.highlighted_index(&list), 1);
        machine.handle(SelectionEvent::PointerEnter(7), &list);
        assert_eq!(machine.highlighted_index(&list), 1);

        let effects = machine.handle(SelectionEvent::PointerClick(0), &list);
        assert!(matches!(effects.last(), Some(SelectionEffect::Committed(c)) if c.id == "1"));
    }

    #[test]
    fn test_blur_then_grace_closes() {
        let list = three();
        let mut machine = open_machine(&list);

        assert_eq!(
            machine.handle(SelectionEvent::Blur, &list),
            vec![SelectionEffect::ScheduleClose]
        );
        assert!(machine.is_open());

        machine.handle(SelectionEvent::CloseGraceElapsed, &list);
        assert!(!machine.is_open());
        assert!(machine.handle(SelectionEvent::Blur, &list).is_empty());
    }

    #[test]
    fn test_list_replacement_resets_highlight() {
        let list = three();
        let mut machine = open_machine(&list);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &list);
        machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &list);

        let replaced = list.replaced_by(vec![Candidate::new("9", "SKU-9", "Flour")]);
        assert_eq!(machine.highlighted_index(&replaced), -1);

        machine.handle(SelectionEvent::KeyDown(Key::ArrowDown), &replaced);
        assert_eq!(machine.highlighted_index(&replaced), 0);
    }

    #[test]
    fn test_typing_opens_and_schedules() {
        let list = three();
        let mut machine = SelectionMachine::new();

        let effects = machine.handle(SelectionEvent::InputChanged("ric".into()), &list);
        assert_eq!(effects, vec![SelectionEffect::ScheduleSearch("ric".into())]);
        assert!(machine.is_open());
        assert_eq!(machine.display_text(), "ric");
        assert_eq!(machine.query_text(), "ric");
    }

    #[test]
    fn test_clearing_input_clears_selection() {
        let list = three();
        let mut machine = open_machine(&list);
        machine.handle(SelectionEvent::PointerClick(0), &list);

        let effects = machine.handle(SelectionEvent::InputChanged(String::new()), &list);
        assert_eq!(
            effects,
            vec![
                SelectionEffect::Cleared,
                SelectionEffect::ScheduleSearch(String::new()),
            ]
        );
        assert!(machine.selected().is_none());
        assert_eq!(machine.display_text(), "");
    }

    #[test]
    fn test_sync_value() {
        let list = three();
        let mut machine = SelectionMachine::new();

        assert!(machine.sync_value("2", &list));
        assert_eq!(machine.display_text(), "SKU-2 - Sugar 1kg");
        assert!(!machine.sync_value("2", &list));
        assert!(!machine.sync_value("404", &list));
        assert_eq!(machine.selected().map(|c| c.id.as_str()), Some("2"));

        assert!(machine.sync_value("", &list));
        assert!(machine.selected().is_none());
        assert_eq!(machine.display_text(), "");
        assert!(!machine.sync_value("", &list));
    }

    #[test]
    fn test_bound_value_resolves_when_list_arrives() {
        let empty = CandidateList::empty();
        let mut machine = SelectionMachine::new();

        assert!(!machine.sync_value("3", &empty));
        assert_eq!(machine.pending_value(), Some("3"));
        assert!(machine.selected().is_none());

        let list = three();
        assert_eq!(machine.pending_match(&list).map(|c| c.id.as_str()), Some("3"));
        machine.handle(SelectionEvent::Focus, &list);
        assert_eq!(machine.selected().map(|c| c.id.as_str()), Some("3"));
        assert_eq!(machine.display_text(), "SKU-3 - Salt");
        assert_eq!(machine.pending_value(), None);
    }

    #[test]
    fn test_typing_drops_pending_bound_value() {
        let empty = CandidateList::empty();
        let mut machine = SelectionMachine::new();
        machine.sync_value("3", &empty);

        machine.handle(SelectionEvent::InputChanged("teh".into()), &empty);
        assert_eq!(machine.pending_value(), None);

        machine.handle(SelectionEvent::Focus, &three());
        assert!(machine.selected().is_none());
        assert_eq!(machine.display_text(), "teh");
    }
}
