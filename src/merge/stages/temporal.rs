//! Temporal inference stage: builds one chain per object and applies the
//! inferred bounds to its working feature.

use std::collections::BTreeSet;

use crate::config::FusionConfig;
use crate::core::{Feature, ProvenanceEntry, SourceId, SourceRole, Strength};
use crate::error::Result;
use crate::merge::context::{FusionContext, ObjectOrigin};
use crate::merge::pipeline::{Artifact, Stage};
use crate::temporal::{StartRule, TemporalBounds, TemporalChain, TemporalEngine};

/// Temporal inference stage.
pub struct TemporalInference;

impl Stage for TemporalInference {
    fn name(&self) -> &'static str {
        "temporal_inference"
    }

    fn requires(&self) -> &'static [Artifact] {
        &[Artifact::Matches]
    }

    fn produces(&self) -> &'static [Artifact] {
        &[Artifact::TemporalBounds]
    }

    fn run(&self, ctx: &mut FusionContext, config: &FusionConfig) -> Result<()> {
        let engine = TemporalEngine::new(config.temporal.clone());

        // (id, reference year) of snapshots strong enough to confirm absence
        let absence_sources: Vec<(SourceId, i32)> = ctx
            .catalog
            .snapshots()
            .into_iter()
            .filter(|d| d.find_strength >= Strength::Medium)
            .filter_map(|d| d.reference_year.map(|y| (d.id.clone(), y)))
            .collect();
        let baseline_sources: Vec<SourceId> = ctx
            .catalog
            .iter()
            .filter(|d| d.role == SourceRole::Baseline)
            .map(|d| d.id.clone())
            .collect();

        for i in 0..ctx.objects.len() {
            let chain = build_chain(ctx, config, i, &absence_sources, &baseline_sources);
            let bounds = engine.infer(&chain);
            let origin = ctx.objects[i].origin;
            apply_bounds(&mut ctx.features[i], &bounds, origin);

            let report = &mut ctx.report.temporal;
            match (bounds.evidence, bounds.date_kind) {
                (Some(evidence), Some(kind)) => {
                    *report
                        .by_evidence
                        .entry(evidence.as_str().to_string())
                        .or_default() += 1;
                    *report.by_date_kind.entry(kind.as_str().to_string()).or_default() += 1;
                }
                _ => report.undated += 1,
            }
            if bounds.date_conflict {
                report.date_conflicts += 1;
                log::debug!(
                    "Date conflict on {}: registry start {:?} after a snapshot confirmation",
                    ctx.objects[i].id,
                    bounds.start_date
                );
            }
            ctx.objects[i].bounds = Some(bounds);
        }

        let report = &ctx.report.temporal;
        log::info!(
            "Temporal inference: {} objects, {} undated, {} date conflicts",
            ctx.objects.len(),
            report.undated,
            report.date_conflicts
        );
        Ok(())
    }
}

/// Observations of object `i` from its members, the covering snapshots and
/// the baseline.
fn build_chain(
    ctx: &FusionContext,
    config: &FusionConfig,
    i: usize,
    absence_sources: &[(SourceId, i32)],
    baseline_sources: &[SourceId],
) -> TemporalChain {
    let object = &ctx.objects[i];
    let feature = &ctx.features[i];
    let mut chain = TemporalChain::new();
    let mut member_sources = BTreeSet::new();
    let mut baseline_member = None;

    for &m in &object.members {
        let f = &ctx.inputs[m];
        let Some(d) = ctx.catalog.get(&f.source) else {
            continue;
        };
        member_sources.insert(f.source.as_str());
        match d.role {
            role if role.is_registry() => {
                let rank = config.priority.rank(&ctx.catalog, &f.source);
                if let Some(year) = f.start_date {
                    chain.registry_start(year, f.source.clone(), rank);
                }
                if let Some(year) = f.end_date {
                    chain.registry_end(year, f.source.clone(), rank);
                }
            }
            SourceRole::Baseline => {
                if baseline_member.is_none() {
                    baseline_member = Some(f.source.clone());
                }
            }
            _ => {
                let confident = f.confidence.unwrap_or(1.0)
                    >= config.temporal.min_detection_confidence;
                if d.verify_strength != Strength::None
                    && confident
                    && let Some(year) = d.reference_year
                {
                    let group = f
                        .map_source
                        .clone()
                        .unwrap_or_else(|| d.independence_key().to_string());
                    chain.present(year, f.source.clone(), group);
                }
            }
        }
    }

    for (source, year) in absence_sources {
        if !member_sources.contains(source.as_str()) && ctx.covers(source, feature) {
            chain.absent(*year, source.clone());
        }
    }

    match baseline_member {
        Some(source) => chain.baseline(ctx.baseline_year, source, true),
        None => {
            if let Some(source) = baseline_sources.iter().find(|s| ctx.covers(s, feature)) {
                chain.baseline(ctx.baseline_year, source.clone(), false);
            }
        }
    }
    chain
}

fn rule_name(rule: StartRule) -> &'static str {
    match rule {
        StartRule::Registry => "registry",
        StartRule::SnapshotPresence => "snapshot_presence",
        StartRule::PostdatesSnapshots => "postdates_snapshots",
    }
}

fn apply_bounds(feature: &mut Feature, bounds: &TemporalBounds, origin: ObjectOrigin) {
    feature.start_date = bounds.start_date;
    feature.end_date = bounds.end_date;
    feature.date_kind = bounds.date_kind;
    feature.evidence = bounds.evidence;
    if origin != ObjectOrigin::Baseline && bounds.end_date.is_some() {
        feature.demolished = true;
    }

    if let Some(source) = &bounds.start_source {
        let mut entry =
            ProvenanceEntry::from_source(source.clone()).with_contributors(bounds.sources.clone());
        if let Some(rule) = bounds.rule {
            entry = entry.with_note(rule_name(rule));
        }
        feature.provenance.record("start_date", entry);
    }
    if let Some(source) = &bounds.end_source {
        feature.provenance.record(
            "end_date",
            ProvenanceEntry::from_source(source.clone()).with_contributors(bounds.sources.clone()),
        );
    }
}
