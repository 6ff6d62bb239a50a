//! Source descriptors and the catalog of all sources in a run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::bounds::GeoBounds;
use super::feature::SourceId;

/// What kind of dataset a source is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    /// Authoritative registry with exact years
    Registry,
    /// Municipal building/permit records
    MunicipalRecord,
    /// Historical-map detections checked by a human
    VerifiedDetection,
    /// Modern undated crowd-sourced baseline
    Baseline,
    /// Raw historical-map detections
    UnverifiedDetection,
}

impl SourceRole {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceRole::Registry => "registry",
            SourceRole::MunicipalRecord => "municipal_record",
            SourceRole::VerifiedDetection => "verified_detection",
            SourceRole::Baseline => "baseline",
            SourceRole::UnverifiedDetection => "unverified_detection",
        }
    }

    /// Dated record sources.
    pub fn is_registry(&self) -> bool {
        matches!(self, SourceRole::Registry | SourceRole::MunicipalRecord)
    }

    /// Map-snapshot (machine-detection) sources.
    pub fn is_snapshot(&self) -> bool {
        matches!(
            self,
            SourceRole::VerifiedDetection | SourceRole::UnverifiedDetection
        )
    }

    /// Default find strength for the role.
    pub fn default_find_strength(&self) -> Strength {
        match self {
            SourceRole::Registry | SourceRole::MunicipalRecord => Strength::Low,
            SourceRole::Baseline => Strength::High,
            SourceRole::VerifiedDetection => Strength::High,
            SourceRole::UnverifiedDetection => Strength::Medium,
        }
    }

    /// Default verify strength for the role.
    pub fn default_verify_strength(&self) -> Strength {
        match self {
            SourceRole::Registry | SourceRole::MunicipalRecord => Strength::High,
            SourceRole::Baseline => Strength::Medium,
            SourceRole::VerifiedDetection => Strength::High,
            SourceRole::UnverifiedDetection => Strength::Medium,
        }
    }
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ability of a source to find or verify objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    /// Not usable for this purpose
    None,
    /// Weak
    Low,
    /// Moderate
    Medium,
    /// Strong
    High,
}

/// Static metadata for one data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Source identifier
    pub id: SourceId,
    /// Dataset kind
    pub role: SourceRole,
    /// Explicit priority rank (lower wins); role default when absent
    #[serde(default)]
    pub priority: Option<u8>,
    /// Ability to discover previously unseen objects
    pub find_strength: Strength,
    /// Ability to confirm existence at a point in time
    pub verify_strength: Strength,
    /// Fixed year of a map snapshot, or of the baseline extract
    #[serde(default)]
    pub reference_year: Option<i32>,
    /// Map sheet identifier used as the independence key
    #[serde(default)]
    pub map_source: Option<String>,
    /// Area the source covers; derived from its features when absent
    #[serde(default)]
    pub coverage: Option<GeoBounds>,
}

impl SourceDescriptor {
    /// Descriptor with role-default strengths.
    pub fn new(id: impl Into<SourceId>, role: SourceRole) -> Self {
        Self {
            id: id.into(),
            role,
            priority: None,
            find_strength: role.default_find_strength(),
            verify_strength: role.default_verify_strength(),
            reference_year: None,
            map_source: None,
            coverage: None,
        }
    }

    /// Builder-style setter for the reference year.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    /// Builder-style setter for the map sheet identifier.
    pub fn with_map_source(mut self, map_source: impl Into<String>) -> Self {
        self.map_source = Some(map_source.into());
        self
    }

    /// Builder-style setter for strengths.
    pub fn with_strengths(mut self, find: Strength, verify: Strength) -> Self {
        self.find_strength = find;
        self.verify_strength = verify;
        self
    }

    /// Builder-style setter for the explicit priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Builder-style setter for the coverage box.
    pub fn with_coverage(mut self, coverage: GeoBounds) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Independence key: map sheet if declared, else source id.
    pub fn independence_key(&self) -> &str {
        self.map_source.as_deref().unwrap_or(&self.id)
    }
}

/// All sources of a run, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct SourceCatalog {
    sources: BTreeMap<SourceId, SourceDescriptor>,
}

impl SourceCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. Returns the previous descriptor with the same id.
    pub fn insert(&mut self, descriptor: SourceDescriptor) -> Option<SourceDescriptor> {
        self.sources.insert(descriptor.id.clone(), descriptor)
    }

    /// Look up a source.
    pub fn get(&self, id: &str) -> Option<&SourceDescriptor> {
        self.sources.get(id)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut SourceDescriptor> {
        self.sources.get_mut(id)
    }

    /// Role of a source.
    pub fn role(&self, id: &str) -> Option<SourceRole> {
        self.sources.get(id).map(|d| d.role)
    }

    /// Iterate descriptors in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.values()
    }

    /// Snapshot sources sorted by reference year, then id.
    pub fn snapshots(&self) -> Vec<&SourceDescriptor> {
        let mut snaps: Vec<_> = self.iter().filter(|d| d.role.is_snapshot()).collect();
        snaps.sort_by(|a, b| a.reference_year.cmp(&b.reference_year).then(a.id.cmp(&b.id)));
        snaps
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// No sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FromIterator<SourceDescriptor> for SourceCatalog {
    fn from_iter<I: IntoIterator<Item = SourceDescriptor>>(iter: I) -> Self {
        let mut catalog = SourceCatalog::new();
        for d in iter {
            catalog.insert(d);
        }
        catalog
    }
}
