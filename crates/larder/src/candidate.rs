//! Selectable search results.
//!
//! A [`Candidate`] is the engine's view of one row in a combobox dropdown: an
//! id, two display labels and the untouched backend record. Domain records
//! become candidates through [`IntoCandidate`] (see [`crate::domain`]).

use serde::{Deserialize, Serialize};

// ============================================================================
// Candidate
// ============================================================================

/// One selectable search result.
///
/// Ids are assumed unique within a list; nothing enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Identifier reported through the combobox's bound value.
    pub id: String,
    /// Main label, e.g. an item code.
    pub primary_label: String,
    /// Secondary label, e.g. an item name. May be empty.
    #[serde(default)]
    pub secondary_label: String,
    /// The backend record this candidate was built from.
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl Candidate {
    /// Create a candidate without a raw payload.
    pub fn new(
        id: impl Into<String>,
        primary_label: impl Into<String>,
        secondary_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            primary_label: primary_label.into(),
            secondary_label: secondary_label.into(),
            raw: serde_json::Value::Null,
        }
    }

    /// Attach the raw backend record using builder pattern.
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }

    /// The text shown in the input once this candidate is committed.
    ///
    /// `"<primary> - <secondary>"`, or just the primary label when there is
    /// no secondary label.
    pub fn display_text(&self) -> String {
        if self.secondary_label.is_empty() {
            self.primary_label.clone()
        } else {
            format!("{} - {}", self.primary_label, self.secondary_label)
        }
    }
}

/// Conversion from a domain record into a [`Candidate`].
pub trait IntoCandidate {
    /// Build the candidate. The record itself should end up in `raw`.
    fn into_candidate(self) -> Candidate;
}

impl IntoCandidate for Candidate {
    fn into_candidate(self) -> Candidate {
        self
    }
}

// ============================================================================
// Candidate List
// ============================================================================

/// An ordered candidate list in server response order.
///
/// Lists are never merged. Each replacement produces a list with a higher
/// `revision`, which lets readers notice that indices they hold (such as a
/// highlighted row) refer to an older list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateList {
    revision: u64,
    items: Vec<Candidate>,
}

impl CandidateList {
    /// The initial, never-loaded list (revision 0).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the list that replaces `self`.
    pub(crate) fn replaced_by(&self, items: Vec<Candidate>) -> Self {
        Self {
            revision: self.revision + 1,
            items,
        }
    }

    /// How many times the list has been replaced. Zero means nothing has
    /// loaded yet.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether any response has been applied yet.
    pub fn has_loaded(&self) -> bool {
        self.revision > 0
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no candidates.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the candidate at `index`.
    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.items.get(index)
    }

    /// Find a candidate by id.
    pub fn find(&self, id: &str) -> Option<&Candidate> {
        self.items.iter().find(|c| c.id == id)
    }

    /// Iterate in response order.
    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }

    /// The candidates as a slice.
    pub fn as_slice(&self) -> &[Candidate] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ============================================================================
// Candidate Kind
// ============================================================================

/// What a combobox looks up. Drives user-facing wording only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    #[default]
    Items,
    Recipes,
    Branches,
    Suppliers,
}

impl CandidateKind {
    /// Plural noun, e.g. `"items"`.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Recipes => "recipes",
            Self::Branches => "branches",
            Self::Suppliers => "suppliers",
        }
    }

    /// Input placeholder, e.g. `"Search items..."`.
    pub fn placeholder(self) -> String {
        format!("Search {}...", self.plural())
    }

    /// Notification text when a fetch fails without a server message.
    pub fn failure_message(self, query: &str) -> String {
        if query.trim().is_empty() {
            format!("Failed to load {}", self.plural())
        } else {
            format!("Failed to search {}", self.plural())
        }
    }

    /// Dropdown text for an empty result.
    pub fn empty_message(self, query: &str) -> String {
        if query.is_empty() {
            format!("No {} available", self.plural())
        } else {
            format!("No {} found", self.plural())
        }
    }
}
