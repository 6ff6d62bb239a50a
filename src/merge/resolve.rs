//! Priority-based attribute resolution across the members of one object.
//!
//! Members are ranked by source priority (lower wins), then detection
//! confidence, then id. Geometry first keeps only the richest geometry
//! class offered. Attributes offered by several sources record every
//! contributor in the provenance.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::core::{Feature, FeatureClass, FeatureId, ProvenanceEntry, SourceCatalog, SourceId};

use super::priority::PriorityConfig;

/// A member observation with its source rank.
#[derive(Clone, Copy, Debug)]
pub struct RankedMember<'a> {
    /// Source priority rank
    pub rank: u8,
    /// The observation
    pub feature: &'a Feature,
}

/// Members in resolution order.
pub fn rank_members<'a>(
    catalog: &SourceCatalog,
    priority: &PriorityConfig,
    inputs: &'a [Feature],
    members: &[usize],
) -> Vec<RankedMember<'a>> {
    let mut ranked: Vec<RankedMember<'a>> = members
        .iter()
        .map(|&m| RankedMember {
            rank: priority.rank(catalog, &inputs[m].source),
            feature: &inputs[m],
        })
        .collect();
    ranked.sort_by(|a, b| {
        let ca = a.feature.confidence.unwrap_or(1.0);
        let cb = b.feature.confidence.unwrap_or(1.0);
        a.rank
            .cmp(&b.rank)
            .then_with(|| cb.partial_cmp(&ca).unwrap_or(Ordering::Equal))
            .then_with(|| a.feature.id.cmp(&b.feature.id))
    });
    ranked
}

/// Member whose geometry the object takes.
pub fn select_geometry<'a>(ranked: &[RankedMember<'a>]) -> Option<&'a Feature> {
    let richest = ranked.iter().map(|m| m.feature.geometry.class()).max()?;
    ranked
        .iter()
        .find(|m| m.feature.geometry.class() == richest)
        .map(|m| m.feature)
}

/// Undated working feature for a new object.
pub fn seed_feature(id: &FeatureId, ranked: &[RankedMember<'_>]) -> Option<Feature> {
    let winner = select_geometry(ranked)?;
    let mut f = Feature::new(
        id.clone(),
        winner.source.clone(),
        FeatureClass::empty(winner.feature_type()),
        winner.geometry.clone(),
    );
    f.confidence = winner.confidence;
    f.map_source = winner.map_source.clone();
    Some(f)
}

/// Distinct member sources sorted by (rank, source id).
pub fn all_sources(ranked: &[RankedMember<'_>]) -> Vec<SourceId> {
    let sources: BTreeSet<(u8, &SourceId)> =
        ranked.iter().map(|m| (m.rank, &m.feature.source)).collect();
    let mut out: Vec<SourceId> = Vec::with_capacity(sources.len());
    for (_, s) in sources {
        if !out.contains(s) {
            out.push(s.clone());
        }
    }
    out
}

struct Pick<T> {
    value: T,
    source: SourceId,
    contributors: Vec<SourceId>,
}

impl<T> Pick<T> {
    fn entry(&self) -> Option<ProvenanceEntry> {
        (self.contributors.len() > 1).then(|| {
            ProvenanceEntry::from_source(self.source.clone())
                .with_contributors(self.contributors.clone())
        })
    }
}

/// First offered value in rank order, with every offering source.
fn pick<'a, T, F>(ranked: &[RankedMember<'a>], get: F) -> Option<Pick<T>>
where
    F: Fn(&'a Feature) -> Option<T>,
{
    let mut winner: Option<(T, &SourceId)> = None;
    let mut contributors: Vec<SourceId> = Vec::new();
    for m in ranked {
        let Some(value) = get(m.feature) else {
            continue;
        };
        if !contributors.contains(&m.feature.source) {
            contributors.push(m.feature.source.clone());
        }
        if winner.is_none() {
            winner = Some((value, &m.feature.source));
        }
    }
    winner.map(|(value, source)| Pick {
        value,
        source: source.clone(),
        contributors,
    })
}

/// Resolve geometry, class attributes, extra properties and `all_sources`.
pub fn resolve_attributes(feature: &mut Feature, ranked: &[RankedMember<'_>]) {
    if let Some(winner) = select_geometry(ranked) {
        feature.geometry = winner.geometry.clone();
        feature.source = winner.source.clone();
        feature.confidence = winner.confidence;
        feature.map_source = winner.map_source.clone();
        let offered = all_sources(ranked);
        if offered.len() > 1 {
            feature.provenance.record(
                "geometry",
                ProvenanceEntry::from_source(winner.source.clone()).with_contributors(offered),
            );
        }
    }

    if let Some(p) = pick(ranked, |f| f.class.subtype().map(str::to_string)) {
        if let Some(entry) = p.entry() {
            feature.provenance.record("subtype", entry);
        }
        feature.class.set_subtype(Some(p.value));
    }
    if let Some(p) = pick(ranked, |f| f.class.name().map(str::to_string)) {
        if let Some(entry) = p.entry() {
            feature.provenance.record("name", entry);
        }
        feature.class.set_name(Some(p.value));
    }
    if let Some(p) = pick(ranked, |f| f.class.levels()) {
        if let Some(entry) = p.entry() {
            feature.provenance.record("levels", entry);
        }
        feature.class.set_levels(Some(p.value));
    }

    let keys: BTreeSet<&String> = ranked.iter().flat_map(|m| m.feature.extra.keys()).collect();
    for key in keys {
        if let Some(p) = pick(ranked, |f| f.extra.get(key).cloned()) {
            if let Some(entry) = p.entry() {
                feature.provenance.record(format!("extra.{key}"), entry);
            }
            feature.extra.insert(key.clone(), p.value);
        }
    }

    feature.all_sources = all_sources(ranked);
}
