//! Lifetime inference from a temporal chain.
//!
//! Start date, in precedence:
//! 1. Registry record: exact year, high evidence
//! 2. Snapshot presence: oldest confirming year, `not-later-than`; high
//!    evidence with two or more independent map sheets, else medium
//! 3. Absent from every covering snapshot but present in the baseline:
//!    appearance estimate after the newest snapshot, low evidence, `inferred`
//!
//! End date: a registry record wins; otherwise the first absence after the
//! last presence bounds the disappearance. Without any temporal evidence the
//! object stays undated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::{DateKind, Evidence, SourceId};

use super::chain::{Observation, ObservationKind, TemporalChain};
use super::config::TemporalConfig;

/// Which start-date rule fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartRule {
    /// Registry record
    Registry,
    /// Oldest snapshot confirmation
    SnapshotPresence,
    /// Postdates every covering snapshot
    PostdatesSnapshots,
}

/// Inferred lifetime of one object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemporalBounds {
    /// First year of existence
    pub start_date: Option<i32>,
    /// Last year of existence
    pub end_date: Option<i32>,
    /// How the start was obtained
    pub date_kind: Option<DateKind>,
    /// Trust in the start
    pub evidence: Option<Evidence>,
    /// Rule that produced the start
    pub rule: Option<StartRule>,
    /// Source that determined the start
    pub start_source: Option<SourceId>,
    /// Source that determined the end
    pub end_source: Option<SourceId>,
    /// Every source with an observation, sorted
    pub sources: Vec<SourceId>,
    /// Registry sources with a record, sorted
    pub registry_sources: Vec<SourceId>,
    /// Distinct map sheets confirming presence
    pub snapshot_confirmations: usize,
    /// Snapshot sheets plus baseline presence
    pub independent_confirmations: usize,
    /// Registry start later than a snapshot confirmation
    pub date_conflict: bool,
}

impl TemporalBounds {
    /// No start could be derived.
    pub fn is_undated(&self) -> bool {
        self.start_date.is_none()
    }
}

/// Derives lifetimes from temporal chains.
#[derive(Clone, Debug, Default)]
pub struct TemporalEngine {
    config: TemporalConfig,
}

impl TemporalEngine {
    /// Create an engine.
    pub fn new(config: TemporalConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &TemporalConfig {
        &self.config
    }

    /// Infer the lifetime bounds of one object.
    pub fn infer(&self, chain: &TemporalChain) -> TemporalBounds {
        let mut bounds = TemporalBounds::default();
        let obs = chain.observations();

        let mut sources = BTreeSet::new();
        let mut registry = BTreeSet::new();
        let mut groups = BTreeSet::new();
        let mut baseline_present = false;
        for o in obs {
            sources.insert(o.source.clone());
            match &o.kind {
                ObservationKind::RegistryStart { .. } | ObservationKind::RegistryEnd { .. } => {
                    registry.insert(o.source.clone());
                }
                ObservationKind::Present { group } => {
                    groups.insert(group.as_str());
                }
                ObservationKind::BaselinePresent => baseline_present = true,
                _ => {}
            }
        }
        bounds.snapshot_confirmations = groups.len();
        bounds.independent_confirmations = groups.len() + usize::from(baseline_present);
        bounds.sources = sources.into_iter().collect();
        bounds.registry_sources = registry.into_iter().collect();

        self.infer_start(obs, &mut bounds);
        self.infer_end(obs, &mut bounds);

        if let (Some(start), Some(end)) = (bounds.start_date, bounds.end_date)
            && end < start
        {
            bounds.end_date = Some(start);
        }
        bounds
    }

    fn infer_start(&self, obs: &[Observation], bounds: &mut TemporalBounds) {
        let first_present = obs
            .iter()
            .find(|o| matches!(o.kind, ObservationKind::Present { .. }));

        // Rule 1: registry
        let registry = obs
            .iter()
            .filter_map(|o| match o.kind {
                ObservationKind::RegistryStart { priority } => Some((priority, o)),
                _ => None,
            })
            .min_by(|(pa, a), (pb, b)| {
                pa.cmp(pb)
                    .then(a.year.cmp(&b.year))
                    .then_with(|| a.source.cmp(&b.source))
            });
        if let Some((_, record)) = registry {
            bounds.start_date = Some(record.year);
            bounds.date_kind = Some(DateKind::Exact);
            bounds.evidence = Some(Evidence::High);
            bounds.rule = Some(StartRule::Registry);
            bounds.start_source = Some(record.source.clone());
            bounds.date_conflict = first_present.is_some_and(|p| p.year < record.year);
            return;
        }

        // Rule 2: oldest snapshot confirmation
        if let Some(present) = first_present {
            bounds.start_date = Some(present.year);
            bounds.date_kind = Some(DateKind::NotLaterThan);
            bounds.evidence = Some(if bounds.snapshot_confirmations >= 2 {
                Evidence::High
            } else {
                Evidence::Medium
            });
            bounds.rule = Some(StartRule::SnapshotPresence);
            bounds.start_source = Some(present.source.clone());
            return;
        }

        // Rule 3: postdates every covering snapshot
        let baseline = obs
            .iter()
            .find(|o| o.kind == ObservationKind::BaselinePresent);
        let newest_absent = obs
            .iter()
            .rev()
            .find(|o| o.kind == ObservationKind::Absent);
        if let (Some(baseline), Some(absent)) = (baseline, newest_absent) {
            bounds.start_date = Some(
                self.config
                    .transition_policy
                    .appearance(absent.year, baseline.year),
            );
            bounds.date_kind = Some(DateKind::Inferred);
            bounds.evidence = Some(Evidence::Low);
            bounds.rule = Some(StartRule::PostdatesSnapshots);
            bounds.start_source = Some(baseline.source.clone());
        }
    }

    fn infer_end(&self, obs: &[Observation], bounds: &mut TemporalBounds) {
        let registry_end = obs
            .iter()
            .filter_map(|o| match o.kind {
                ObservationKind::RegistryEnd { priority } => Some((priority, o)),
                _ => None,
            })
            .min_by(|(pa, a), (pb, b)| {
                pa.cmp(pb)
                    .then(a.year.cmp(&b.year))
                    .then_with(|| a.source.cmp(&b.source))
            });
        if let Some((_, record)) = registry_end {
            bounds.end_date = Some(record.year);
            bounds.end_source = Some(record.source.clone());
            return;
        }

        let Some(last_presence) = obs.iter().filter(|o| o.kind.is_presence()).map(|o| o.year).max()
        else {
            return;
        };
        if let Some(absent) = obs
            .iter()
            .find(|o| o.kind.is_absence() && o.year > last_presence)
        {
            bounds.end_date = Some(
                self.config
                    .transition_policy
                    .disappearance(last_presence, absent.year),
            );
            bounds.end_source = Some(absent.source.clone());
        }
    }
}
