//! Replacement detection between an earlier and a later feature set.
//!
//! A later feature replaces an earlier one when:
//! - both are polygons of the same feature type
//! - the footprints overlap by at least `min_overlap_ratio` of the smaller one
//! - the later centroid lies inside the earlier feature's convex hull
//! - the earlier feature's date evidence passes the era gate
//!
//! Linking tightens the earlier feature's end date to the later feature's
//! start (or a fixed offset before the later set's reference year) and marks
//! it demolished.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::config::{ConfigError, ensure_unit};
use crate::core::{Evidence, Feature};
use crate::matching::{Match, ProjectedFeature, build_index};

use super::graph::{LinkKind, ReplacementLink};

/// Minimum evidence required for features started up to `until_year`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraGate {
    /// Last start year covered by this gate (inclusive)
    pub until_year: i32,
    /// Minimum date evidence of the earlier feature
    pub min_evidence: Evidence,
}

/// Configuration for replacement detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplacementConfig {
    /// Minimum intersection / smaller-area ratio.
    /// Default: 0.5
    #[serde(default = "defaults::min_overlap_ratio")]
    pub min_overlap_ratio: f64,

    /// Years before the later set's reference year used as the end date
    /// when the replacing feature has no start date.
    /// Default: 1
    #[serde(default = "defaults::fallback_offset_years")]
    pub fallback_offset_years: i32,

    /// Era-gated evidence thresholds.
    /// Default: until 1899 high, until 1950 medium
    #[serde(default = "defaults::era_gates")]
    pub era_gates: Vec<EraGate>,

    /// Evidence required after the last gate.
    /// Default: low
    #[serde(default = "defaults::default_min_evidence")]
    pub default_min_evidence: Evidence,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            min_overlap_ratio: defaults::min_overlap_ratio(),
            fallback_offset_years: defaults::fallback_offset_years(),
            era_gates: defaults::era_gates(),
            default_min_evidence: defaults::default_min_evidence(),
        }
    }
}

impl ReplacementConfig {
    /// Builder-style setter for the overlap threshold.
    pub fn with_min_overlap_ratio(mut self, ratio: f64) -> Self {
        self.min_overlap_ratio = ratio;
        self
    }

    /// Builder-style setter for the era gates.
    pub fn with_era_gates(mut self, gates: Vec<EraGate>) -> Self {
        self.era_gates = gates;
        self
    }

    /// Evidence an earlier feature needs given its start year.
    ///
    /// Undated features must meet the strictest gate.
    pub fn required_evidence(&self, start: Option<i32>) -> Evidence {
        let Some(year) = start else {
            return self
                .era_gates
                .iter()
                .map(|g| g.min_evidence)
                .fold(self.default_min_evidence, Evidence::max);
        };
        self.era_gates
            .iter()
            .filter(|g| year <= g.until_year)
            .min_by_key(|g| g.until_year)
            .map_or(self.default_min_evidence, |g| g.min_evidence)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_unit("replacement.min_overlap_ratio", self.min_overlap_ratio)?;
        if self.fallback_offset_years < 0 {
            return Err(ConfigError::invalid(
                "replacement.fallback_offset_years",
                "must be >= 0",
            ));
        }
        Ok(())
    }
}

/// Links found in one detection pass.
#[derive(Clone, Debug, Default)]
pub struct ReplacementOutcome {
    /// Accepted links
    pub links: Vec<ReplacementLink>,
    /// Candidates that failed the era gate
    pub rejected_by_era: usize,
    /// Overlapping candidates below the overlap threshold or outside the hull
    pub rejected_by_overlap: usize,
}

impl ReplacementOutcome {
    /// Fold another pass into this one.
    pub fn merge(&mut self, other: ReplacementOutcome) {
        self.links.extend(other.links);
        self.rejected_by_era += other.rejected_by_era;
        self.rejected_by_overlap += other.rejected_by_overlap;
    }
}

/// Detects features superseded by later features on the same footprint.
#[derive(Clone, Debug, Default)]
pub struct ReplacementDetector {
    config: ReplacementConfig,
}

impl ReplacementDetector {
    /// Create a detector.
    pub fn new(config: ReplacementConfig) -> Self {
        Self { config }
    }

    /// Detector configuration.
    pub fn config(&self) -> &ReplacementConfig {
        &self.config
    }

    /// Whether the earlier feature's evidence passes its era gate.
    pub fn passes_era_gate(&self, earlier: &Feature) -> bool {
        let evidence = earlier.evidence.unwrap_or(Evidence::Low);
        evidence >= self.config.required_evidence(earlier.start_date)
    }

    /// End year for a feature replaced by `later`.
    pub fn end_year(&self, later: &Feature, reference_year: i32) -> i32 {
        later
            .start_date
            .unwrap_or(reference_year - self.config.fallback_offset_years)
    }

    /// Test every later polygon against every overlapping earlier polygon.
    pub fn detect(
        &self,
        earlier: &[ProjectedFeature<'_>],
        later: &[ProjectedFeature<'_>],
        reference_year: i32,
    ) -> ReplacementOutcome {
        let index = build_index(earlier);
        let mut outcome = ReplacementOutcome::default();

        for new in later {
            let Some(new_fp) = new.geometry.as_footprint() else {
                continue;
            };
            for i in index.potential_matches(new_fp.envelope(), 0.0) {
                let old = &earlier[i];
                if old.id() == new.id() || old.feature.feature_type() != new.feature.feature_type()
                {
                    continue;
                }
                let Some(old_fp) = old.geometry.as_footprint() else {
                    continue;
                };
                if let (Some(old_start), Some(new_start)) =
                    (old.feature.start_date, new.feature.start_date)
                    && old_start > new_start
                {
                    continue;
                }

                let overlap = old_fp.overlap_ratio(new_fp);
                if overlap <= 0.0 {
                    continue;
                }
                if overlap < self.config.min_overlap_ratio
                    || !old_fp.convex_hull().contains(new_fp.centroid())
                {
                    outcome.rejected_by_overlap += 1;
                    continue;
                }
                if !self.passes_era_gate(old.feature) {
                    log::debug!(
                        "Replacement {} -> {} rejected by era gate (start {:?}, evidence {:?})",
                        old.id(),
                        new.id(),
                        old.feature.start_date,
                        old.feature.evidence
                    );
                    outcome.rejected_by_era += 1;
                    continue;
                }

                outcome.links.push(ReplacementLink {
                    old: old.id().clone(),
                    new: new.id().clone(),
                    overlap,
                    end_year: self.end_year(new.feature, reference_year),
                    kind: LinkKind::Footprint,
                });
            }
        }
        outcome
    }

    /// Turn a `replaced` road match into a link, subject to the era gate.
    ///
    /// Returns `None` when the gate rejects it.
    pub fn road_link(
        &self,
        historical: &Feature,
        modern: &Feature,
        road_match: &Match,
        reference_year: i32,
    ) -> Option<ReplacementLink> {
        if !self.passes_era_gate(historical) {
            return None;
        }
        Some(ReplacementLink {
            old: historical.id.clone(),
            new: modern.id.clone(),
            overlap: road_match.score,
            end_year: self.end_year(modern, reference_year),
            kind: LinkKind::Road,
        })
    }
}

impl ReplacementLink {
    /// Apply the link to the superseded feature.
    pub fn apply_to_old(&self, old: &mut Feature) {
        old.tighten_end(self.end_year);
        old.demolished = true;
        if !old.replaced_by.contains(&self.new) {
            old.replaced_by.push(self.new.clone());
        }
    }

    /// Apply the link to the superseding feature.
    pub fn apply_to_new(&self, new: &mut Feature) {
        if !new.replaces.contains(&self.old) {
            new.replaces.push(self.old.clone());
        }
    }
}
