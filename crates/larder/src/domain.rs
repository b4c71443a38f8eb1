//! Backend records looked up by the dashboard's comboboxes.
//!
//! Only the fields a lookup needs are typed; everything else the backend
//! sends is kept in the candidate's `raw` payload via `flatten`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::candidate::{Candidate, IntoCandidate};

/// Build a candidate, keeping the serialised record as its raw payload.
fn candidate_from<R: Serialize>(
    record: &R,
    id: &str,
    primary_label: &str,
    secondary_label: &str,
) -> Candidate {
    let raw = serde_json::to_value(record).unwrap_or_default();
    Candidate::new(id, primary_label, secondary_label).with_raw(raw)
}

/// An inventory item. Displayed as `code - name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub stock: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(rename = "type", default)]
    pub category: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IntoCandidate for ItemRecord {
    fn into_candidate(self) -> Candidate {
        let id = self.id.clone().unwrap_or_default();
        candidate_from(&self, &id, &self.code, &self.name)
    }
}

/// A recipe (menu entry). Displayed as `code - name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub branch_id: String,
    pub code: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IntoCandidate for RecipeRecord {
    fn into_candidate(self) -> Candidate {
        let id = self.id.clone().unwrap_or_default();
        candidate_from(&self, &id, &self.code, &self.name)
    }
}

/// A branch (outlet). Displayed as `name - slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IntoCandidate for BranchRecord {
    fn into_candidate(self) -> Candidate {
        candidate_from(&self, &self.id, &self.name, &self.slug)
    }
}

/// A supplier. Displayed by name alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IntoCandidate for SupplierRecord {
    fn into_candidate(self) -> Candidate {
        candidate_from(&self, &self.id, &self.name, "")
    }
}
