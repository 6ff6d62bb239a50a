//! Date-inheritance fallback for features that are still undated.
//!
//! An undated feature borrows the start date of the nearest high-evidence
//! donor within a radius, at low evidence. Without a donor it gets the
//! configured fallback year for its type. Existing dates are never touched.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::config::{ConfigError, ensure_non_negative};
use crate::core::{
    DateKind, Evidence, Feature, FeatureId, FeatureType, GeoPoint, ProvenanceEntry,
};
use crate::spatial::{IndexedFeature, LocalFrame, LocalGeometry, SpatialIndex};

/// Per-type fallback years.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FallbackYears {
    /// Default: 1960
    #[serde(default = "defaults::fallback_year_building")]
    pub building: i32,
    /// Default: 2000
    #[serde(default = "defaults::fallback_year_other")]
    pub road: i32,
    /// Default: 2000
    #[serde(default = "defaults::fallback_year_other")]
    pub water: i32,
    /// Default: 2000
    #[serde(default = "defaults::fallback_year_other")]
    pub landuse: i32,
}

impl Default for FallbackYears {
    fn default() -> Self {
        Self {
            building: defaults::fallback_year_building(),
            road: defaults::fallback_year_other(),
            water: defaults::fallback_year_other(),
            landuse: defaults::fallback_year_other(),
        }
    }
}

impl FallbackYears {
    /// Fallback year for a feature type.
    pub fn for_type(&self, feature_type: FeatureType) -> i32 {
        match feature_type {
            FeatureType::Building => self.building,
            FeatureType::Road => self.road,
            FeatureType::Water => self.water,
            FeatureType::Landuse => self.landuse,
        }
    }
}

/// Configuration for date inheritance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InheritanceConfig {
    /// Maximum donor distance (meters).
    /// Default: 1000m
    #[serde(default = "defaults::max_radius_m")]
    pub max_radius_m: f64,

    /// Only borrow from donors of the same feature type.
    /// Default: true
    #[serde(default = "defaults::enabled")]
    pub same_type_only: bool,

    /// Years assigned when no donor is in range.
    #[serde(default)]
    pub fallback_years: FallbackYears,
}

impl Default for InheritanceConfig {
    fn default() -> Self {
        Self {
            max_radius_m: defaults::max_radius_m(),
            same_type_only: defaults::enabled(),
            fallback_years: FallbackYears::default(),
        }
    }
}

impl InheritanceConfig {
    /// Builder-style setter for the donor radius.
    pub fn with_max_radius(mut self, meters: f64) -> Self {
        self.max_radius_m = meters;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("inheritance.max_radius_m", self.max_radius_m)
    }
}

/// Counters from one inheritance pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InheritanceStats {
    /// Dates borrowed from a donor
    pub inherited: usize,
    /// Fallback years assigned
    pub fallback: usize,
    /// Sum of donor distances, for the mean
    pub total_donor_distance_m: f64,
}

impl InheritanceStats {
    /// Mean donor distance, if anything was inherited.
    pub fn mean_donor_distance_m(&self) -> Option<f64> {
        (self.inherited > 0).then(|| self.total_donor_distance_m / self.inherited as f64)
    }
}

#[derive(Clone, Debug)]
struct Donor {
    id: FeatureId,
    feature_type: FeatureType,
    start: i32,
    geo: GeoPoint,
}

/// Assigns borrowed or fallback dates to undated features.
#[derive(Clone, Debug, Default)]
pub struct DateInheritance {
    config: InheritanceConfig,
}

impl DateInheritance {
    /// Create the fallback pass.
    pub fn new(config: InheritanceConfig) -> Self {
        Self { config }
    }

    /// Pass configuration.
    pub fn config(&self) -> &InheritanceConfig {
        &self.config
    }

    /// Date every feature lacking a start date.
    ///
    /// Donors are features with `evidence = high` and a start date, taken
    /// before any date is assigned in this pass.
    pub fn apply(&self, frame: &LocalFrame, features: &mut [Feature]) -> InheritanceStats {
        let mut donors = Vec::new();
        let mut items = Vec::new();
        for f in features.iter() {
            let (Some(start), Some(Evidence::High)) = (f.start_date, f.evidence) else {
                continue;
            };
            let Some(geometry) = LocalGeometry::project(frame, &f.geometry) else {
                continue;
            };
            let centroid = geometry.centroid();
            items.push(IndexedFeature::new(donors.len(), centroid, (centroid, centroid)));
            donors.push(Donor {
                id: f.id.clone(),
                feature_type: f.feature_type(),
                start,
                geo: frame.to_geo(centroid),
            });
        }
        let index = SpatialIndex::new(items);
        let mut stats = InheritanceStats::default();

        for f in features.iter_mut().filter(|f| f.start_date.is_none()) {
            let donor = LocalGeometry::project(frame, &f.geometry).and_then(|geometry| {
                let centroid = geometry.centroid();
                let feature_type = f.feature_type();
                index
                    .nearest_where(centroid, self.config.max_radius_m, |i| {
                        !self.config.same_type_only || donors[i].feature_type == feature_type
                    })
                    .map(|(i, _)| (&donors[i], frame.to_geo(centroid)))
            });

            match donor {
                Some((donor, here)) => {
                    let distance = here.distance_m(&donor.geo);
                    f.start_date = Some(donor.start);
                    f.date_kind = Some(DateKind::Inferred);
                    f.evidence = Some(Evidence::Low);
                    f.provenance.record(
                        "start_date",
                        ProvenanceEntry {
                            source: f.source.clone(),
                            contributors: Vec::new(),
                            donor: Some(donor.id.clone()),
                            distance_m: Some(distance),
                            note: Some("inherited".to_string()),
                        },
                    );
                    stats.inherited += 1;
                    stats.total_donor_distance_m += distance;
                }
                None => {
                    let year = self.config.fallback_years.for_type(f.feature_type());
                    f.start_date = Some(year);
                    f.date_kind = Some(DateKind::Fallback);
                    f.evidence = Some(Evidence::Low);
                    f.provenance.record(
                        "start_date",
                        ProvenanceEntry::from_source(f.source.clone()).with_note("fallback"),
                    );
                    stats.fallback += 1;
                }
            }
            if let Some(end) = f.end_date
                && let Some(start) = f.start_date
                && end < start
            {
                // Borrowed start must not break an end date already known
                f.start_date = Some(end);
            }
        }

        log::debug!(
            "Date inheritance: {} inherited, {} fallback",
            stats.inherited,
            stats.fallback
        );
        stats
    }
}
