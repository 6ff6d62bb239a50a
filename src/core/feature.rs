//! Feature model: the typed core attribute set plus a per-type variant.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Geometry;
use super::provenance::Provenance;

/// Globally unique feature id, `"<source>:<local id>"`.
pub type FeatureId = String;

/// Data source identifier.
pub type SourceId = String;

/// Physical feature category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    /// Building footprint
    Building,
    /// Road centreline
    Road,
    /// Water body or waterway
    Water,
    /// Land-use area
    Landuse,
}

impl FeatureType {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Building => "building",
            FeatureType::Road => "road",
            FeatureType::Water => "water",
            FeatureType::Landuse => "landuse",
        }
    }

    /// Parse a lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "building" => Some(FeatureType::Building),
            "road" | "highway" => Some(FeatureType::Road),
            "water" => Some(FeatureType::Water),
            "landuse" => Some(FeatureType::Landuse),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific attributes, one variant per [`FeatureType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "feature_type", rename_all = "snake_case")]
pub enum FeatureClass {
    /// Building with optional use subtype and storey count
    Building {
        /// Declared subtype (e.g. "church", "residential")
        subtype: Option<String>,
        /// Number of storeys
        levels: Option<u32>,
    },
    /// Road with optional class and street name
    Road {
        /// Road class (e.g. "primary")
        subtype: Option<String>,
        /// Street name
        name: Option<String>,
    },
    /// Water body
    Water {
        /// Name of the water body
        name: Option<String>,
    },
    /// Land-use area
    Landuse {
        /// Land-use kind (e.g. "cemetery")
        subtype: Option<String>,
    },
}

impl FeatureClass {
    /// Attribute-less class for a feature type.
    pub fn empty(feature_type: FeatureType) -> Self {
        match feature_type {
            FeatureType::Building => FeatureClass::Building {
                subtype: None,
                levels: None,
            },
            FeatureType::Road => FeatureClass::Road {
                subtype: None,
                name: None,
            },
            FeatureType::Water => FeatureClass::Water { name: None },
            FeatureType::Landuse => FeatureClass::Landuse { subtype: None },
        }
    }

    /// The feature type this variant represents.
    pub fn feature_type(&self) -> FeatureType {
        match self {
            FeatureClass::Building { .. } => FeatureType::Building,
            FeatureClass::Road { .. } => FeatureType::Road,
            FeatureClass::Water { .. } => FeatureType::Water,
            FeatureClass::Landuse { .. } => FeatureType::Landuse,
        }
    }

    /// Declared subtype, if the variant carries one.
    pub fn subtype(&self) -> Option<&str> {
        match self {
            FeatureClass::Building { subtype, .. }
            | FeatureClass::Road { subtype, .. }
            | FeatureClass::Landuse { subtype } => subtype.as_deref(),
            FeatureClass::Water { .. } => None,
        }
    }

    /// Name, if the variant carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            FeatureClass::Road { name, .. } | FeatureClass::Water { name } => name.as_deref(),
            _ => None,
        }
    }

    /// Storey count for buildings.
    pub fn levels(&self) -> Option<u32> {
        match self {
            FeatureClass::Building { levels, .. } => *levels,
            _ => None,
        }
    }

    /// Replace the subtype (no-op for variants without one).
    pub fn set_subtype(&mut self, value: Option<String>) {
        match self {
            FeatureClass::Building { subtype, .. }
            | FeatureClass::Road { subtype, .. }
            | FeatureClass::Landuse { subtype } => *subtype = value,
            FeatureClass::Water { .. } => {}
        }
    }

    /// Replace the name (no-op for variants without one).
    pub fn set_name(&mut self, value: Option<String>) {
        match self {
            FeatureClass::Road { name, .. } | FeatureClass::Water { name } => *name = value,
            _ => {}
        }
    }

    /// Replace the storey count (buildings only).
    pub fn set_levels(&mut self, value: Option<u32>) {
        if let FeatureClass::Building { levels, .. } = self {
            *levels = value;
        }
    }

    /// Subtypes are compatible when equal or when either is undeclared.
    pub fn subtype_compatible(&self, other: &FeatureClass) -> bool {
        match (self.subtype(), other.subtype()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => true,
        }
    }

    /// Subtypes are both declared and equal.
    pub fn subtype_equal(&self, other: &FeatureClass) -> bool {
        matches!((self.subtype(), other.subtype()), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
    }
}

/// Trust in a feature's temporal attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    /// Derived or borrowed
    Low,
    /// Single corroborating observation
    Medium,
    /// Authoritative or multiply corroborated
    High,
}

impl Evidence {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Evidence::Low => "low",
            Evidence::Medium => "medium",
            Evidence::High => "high",
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a `start_date` was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateKind {
    /// Recorded construction year
    Exact,
    /// Upper bound from the oldest confirming map snapshot
    NotLaterThan,
    /// Estimated from absence evidence or borrowed from a donor
    Inferred,
    /// Configured per-type default
    Fallback,
}

impl DateKind {
    /// Stable kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DateKind::Exact => "exact",
            DateKind::NotLaterThan => "not-later-than",
            DateKind::Inferred => "inferred",
            DateKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship between a historical road and its modern counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadChange {
    /// Same road
    Unchanged,
    /// Same path, width changed
    Widened,
    /// Partial overlap, path changed
    Rerouted,
    /// Same endpoints, different path
    Replaced,
    /// Historical road without a modern counterpart
    Demolished,
    /// Modern road without a historical counterpart
    New,
}

impl RoadChange {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadChange::Unchanged => "unchanged",
            RoadChange::Widened => "widened",
            RoadChange::Rerouted => "rerouted",
            RoadChange::Replaced => "replaced",
            RoadChange::Demolished => "demolished",
            RoadChange::New => "new",
        }
    }

    /// The historical and modern geometries describe the same road.
    pub fn is_same_road(&self) -> bool {
        matches!(
            self,
            RoadChange::Unchanged | RoadChange::Widened | RoadChange::Rerouted
        )
    }
}

impl fmt::Display for RoadChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse, derived corroboration label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    /// Registry date plus at least one independent confirmation
    Gold,
    /// Two or more agreeing sources
    Silver,
    /// Single authoritative source
    Bronze,
    /// Derived or fallback only
    Inferred,
}

impl QualityTier {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Gold => "gold",
            QualityTier::Silver => "silver",
            QualityTier::Bronze => "bronze",
            QualityTier::Inferred => "inferred",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single geographic observation, and after fusion a resolved feature.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// Unique id
    pub id: FeatureId,
    /// Geometry in lon/lat
    pub geometry: Geometry,
    /// Type and type-specific attributes
    pub class: FeatureClass,
    /// Originating source
    pub source: SourceId,
    /// First year of existence
    pub start_date: Option<i32>,
    /// Last year of existence; `None` means still standing
    pub end_date: Option<i32>,
    /// How `start_date` was obtained
    pub date_kind: Option<DateKind>,
    /// Trust in the dates
    pub evidence: Option<Evidence>,
    /// Detection confidence (machine-detected features only)
    pub confidence: Option<f64>,
    /// Map sheet identifier for detections
    pub map_source: Option<String>,
    /// Known to no longer exist
    pub demolished: bool,
    /// Road change classification
    pub change: Option<RoadChange>,
    /// Features this one superseded
    pub replaces: Vec<FeatureId>,
    /// Features that superseded this one
    pub replaced_by: Vec<FeatureId>,
    /// Every contributing source, priority order
    pub all_sources: Vec<SourceId>,
    /// Derived corroboration tier
    pub quality_tier: Option<QualityTier>,
    /// Attribute-level provenance
    pub provenance: Provenance,
    /// Untyped input properties
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Feature {
    /// Create an undated feature.
    pub fn new(
        id: impl Into<FeatureId>,
        source: impl Into<SourceId>,
        class: FeatureClass,
        geometry: Geometry,
    ) -> Self {
        Self {
            id: id.into(),
            geometry,
            class,
            source: source.into(),
            start_date: None,
            end_date: None,
            date_kind: None,
            evidence: None,
            confidence: None,
            map_source: None,
            demolished: false,
            change: None,
            replaces: Vec::new(),
            replaced_by: Vec::new(),
            all_sources: Vec::new(),
            quality_tier: None,
            provenance: Provenance::default(),
            extra: BTreeMap::new(),
        }
    }

    /// Builder-style setter for an exact start date.
    pub fn with_start(mut self, year: i32, kind: DateKind, evidence: Evidence) -> Self {
        self.start_date = Some(year);
        self.date_kind = Some(kind);
        self.evidence = Some(evidence);
        self
    }

    /// Builder-style setter for the end date.
    pub fn with_end(mut self, year: i32) -> Self {
        self.end_date = Some(year);
        self
    }

    /// Builder-style setter for detection confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Builder-style setter for the map sheet identifier.
    pub fn with_map_source(mut self, map_source: impl Into<String>) -> Self {
        self.map_source = Some(map_source.into());
        self
    }

    /// Feature type shortcut.
    #[inline]
    pub fn feature_type(&self) -> FeatureType {
        self.class.feature_type()
    }

    /// The `start_date <= end_date` invariant.
    pub fn dates_consistent(&self) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }

    /// Set or tighten the end date. Never moves it later, never before start.
    pub fn tighten_end(&mut self, year: i32) {
        let mut end = match self.end_date {
            Some(existing) => existing.min(year),
            None => year,
        };
        if let Some(start) = self.start_date {
            end = end.max(start);
        }
        self.end_date = Some(end);
    }
}
