//! Per-combobox search session state.

/// The search state owned by one combobox.
///
/// `epoch` starts at 0 and is incremented once per issued fetch. It never
/// decreases and a value is never reused, so a response is current exactly
/// when its captured epoch equals `epoch` at arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSession {
    /// Text of the most recently issued fetch.
    pub query_text: String,
    /// Epoch of the most recently issued fetch.
    pub epoch: u64,
    /// Whether the most recently issued fetch is still outstanding.
    pub loading: bool,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new fetch and return its epoch.
    pub(crate) fn advance(&mut self, query: &str) -> u64 {
        self.epoch += 1;
        self.query_text = query.to_owned();
        self.loading = true;
        self.epoch
    }

    /// Whether `epoch` is still the latest issued fetch.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
}
