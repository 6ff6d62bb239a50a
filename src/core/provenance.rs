//! Attribute-level provenance side-table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::feature::{FeatureId, SourceId};

/// Where one attribute value came from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Source whose value was kept
    pub source: SourceId,
    /// Every source that offered a value, priority order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<SourceId>,
    /// Donor feature for inherited dates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<FeatureId>,
    /// Donor distance in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    /// Free-form derivation note (e.g. "transition:midpoint")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ProvenanceEntry {
    /// Entry naming the winning source only.
    pub fn from_source(source: impl Into<SourceId>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for contributors.
    pub fn with_contributors(mut self, contributors: Vec<SourceId>) -> Self {
        self.contributors = contributors;
        self
    }

    /// Builder-style setter for the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Attribute name → provenance entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provenance {
    entries: BTreeMap<String, ProvenanceEntry>,
}

impl Provenance {
    /// Record (or replace) the entry for an attribute.
    pub fn record(&mut self, attribute: impl Into<String>, entry: ProvenanceEntry) {
        self.entries.insert(attribute.into(), entry);
    }

    /// Entry for an attribute.
    pub fn get(&self, attribute: &str) -> Option<&ProvenanceEntry> {
        self.entries.get(attribute)
    }

    /// Iterate entries in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProvenanceEntry)> {
        self.entries.iter()
    }

    /// Number of recorded attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nothing recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
