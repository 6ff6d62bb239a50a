//! Spatial matching: groups input observations into fused objects.
//!
//! 1. Every baseline feature anchors an object
//! 2. Registry records attach to baseline objects (points and polygon
//!    centroids by the point matcher, lines by the road matcher)
//! 3. Snapshot detections, in ascending reference year, attach to baseline
//!    objects; the rest join or seed historical clusters
//! 4. Registry orphans are retried against historical footprints and
//!    otherwise become objects of their own

use std::collections::BTreeMap;

use crate::config::FusionConfig;
use crate::core::{Feature, GeometryClass, RoadChange, SourceId, SourceRole, Strength};
use crate::error::Result;
use crate::matching::{
    FootprintMatcher, Match, PointPolygonMatcher, ProjectedFeature, RoadMatcher, build_index,
};
use crate::merge::context::{FusedObject, FusionContext, ObjectOrigin};
use crate::merge::pipeline::{Artifact, Stage};
use crate::merge::resolve::{rank_members, seed_feature};
use crate::spatial::SpatialIndex;

/// Spatial matching stage.
pub struct SpatialMatching;

impl Stage for SpatialMatching {
    fn name(&self) -> &'static str {
        "spatial_matching"
    }

    fn requires(&self) -> &'static [Artifact] {
        &[Artifact::Inputs]
    }

    fn produces(&self) -> &'static [Artifact] {
        &[Artifact::Matches]
    }

    fn run(&self, ctx: &mut FusionContext, config: &FusionConfig) -> Result<()> {
        let assembly = Assembler::new(config).assemble(ctx);
        install(ctx, config, assembly);
        Ok(())
    }
}

/// Objects and matches produced before they are installed in the context.
#[derive(Default)]
struct Assembly {
    objects: Vec<FusedObject>,
    road_change: Vec<Option<RoadChange>>,
    matches: Vec<Match>,
    orphans: usize,
    orphans_reattached: usize,
    ambiguous: usize,
    discarded: usize,
}

impl Assembly {
    fn push(&mut self, object: FusedObject) -> usize {
        self.objects.push(object);
        self.road_change.push(None);
        self.objects.len() - 1
    }

    fn attach(&mut self, object: usize, input: usize, year: Option<i32>) {
        let o = &mut self.objects[object];
        o.members.push(input);
        if let Some(y) = year {
            o.first_seen = Some(o.first_seen.map_or(y, |s| s.min(y)));
        }
    }

    fn note_change(&mut self, object: usize, change: Option<RoadChange>) {
        if let Some(c) = change {
            let slot = &mut self.road_change[object];
            *slot = Some(slot.map_or(c, |s| s.min(c)));
        }
    }
}

/// Match candidates with their R-tree.
struct Targets<'t, 'a> {
    items: &'t [ProjectedFeature<'a>],
    index: SpatialIndex,
}

impl<'t, 'a> Targets<'t, 'a> {
    fn new(items: &'t [ProjectedFeature<'a>]) -> Self {
        Self {
            items,
            index: build_index(items),
        }
    }
}

/// Historical cluster: object position and its most recent member.
struct Cluster<'a> {
    object: usize,
    representative: ProjectedFeature<'a>,
}

struct Assembler<'c> {
    config: &'c FusionConfig,
    points: PointPolygonMatcher,
    footprints: FootprintMatcher,
    roads: RoadMatcher,
}

impl<'c> Assembler<'c> {
    fn new(config: &'c FusionConfig) -> Self {
        Self {
            config,
            points: PointPolygonMatcher::new(config.point_match.clone()),
            footprints: FootprintMatcher::new(config.footprint_match.clone()),
            roads: RoadMatcher::new(config.road_match.clone()),
        }
    }

    /// Best target for one observation. Returns the match and the target
    /// position.
    ///
    /// Lines go through the road matcher restricted to `accept_road`.
    /// Polygons go through the footprint matcher unless `by_centroid` is
    /// set, in which case they are placed like points.
    fn best<F>(
        &self,
        observation: &ProjectedFeature<'_>,
        targets: &Targets<'_, '_>,
        by_centroid: bool,
        accept_road: F,
        ambiguous: &mut usize,
    ) -> Option<(Match, usize)>
    where
        F: Fn(RoadChange) -> bool,
    {
        let selection = if observation.geometry.as_line().is_some() {
            self.roads
                .best_match_where(observation, targets.items, &targets.index, accept_road)
        } else if observation.geometry.as_footprint().is_some() && !by_centroid {
            self.footprints
                .best_match(observation, targets.items, &targets.index)
        } else {
            self.points
                .select(observation, targets.items, &targets.index)
        }?;
        if selection.ambiguous {
            log::debug!(
                "Ambiguous match for {}: {} chosen by id",
                observation.id(),
                selection.matched.target
            );
            *ambiguous += 1;
        }
        Some((selection.matched, selection.target_index))
    }

    fn assemble<'a>(&self, ctx: &'a FusionContext) -> Assembly {
        let mut out = Assembly::default();

        let mut base: Vec<ProjectedFeature<'a>> = Vec::new();
        let mut registry: Vec<(usize, ProjectedFeature<'a>)> = Vec::new();
        let mut detections: BTreeMap<&str, Vec<(usize, ProjectedFeature<'a>)>> = BTreeMap::new();

        for (i, f) in ctx.inputs.iter().enumerate() {
            let Some(p) = ProjectedFeature::project(&ctx.frame, f) else {
                log::warn!("Skipping {}: degenerate geometry in the local frame", f.id);
                continue;
            };
            match ctx.role_of(i) {
                Some(SourceRole::Baseline) => {
                    out.push(FusedObject::new(f.id.clone(), ObjectOrigin::Baseline, i));
                    base.push(p);
                }
                Some(role) if role.is_registry() => registry.push((i, p)),
                Some(_) => detections.entry(f.source.as_str()).or_default().push((i, p)),
                None => {}
            }
        }
        // Baseline object k is base[k]
        let base_targets = Targets::new(&base);

        let mut orphans = Vec::new();
        for (i, record) in registry {
            let found = self.best(
                &record,
                &base_targets,
                true,
                |c| c.is_same_road(),
                &mut out.ambiguous,
            );
            match found {
                Some((m, k)) => {
                    out.attach(k, i, None);
                    out.matches.push(m);
                }
                None => orphans.push((i, record)),
            }
        }
        out.orphans = orphans.len();

        let mut clusters: Vec<Cluster<'a>> = Vec::new();
        for snapshot in ctx.catalog.snapshots() {
            let Some(year) = snapshot.reference_year else {
                continue;
            };
            let Some(batch) = detections.remove(snapshot.id.as_str()) else {
                continue;
            };
            let can_seed = snapshot.find_strength != Strength::None
                && snapshot.verify_strength != Strength::None;

            // Clusters from earlier snapshots only
            let reps: Vec<ProjectedFeature<'a>> =
                clusters.iter().map(|c| c.representative.clone()).collect();
            let rep_targets = Targets::new(&reps);
            let seeded_before = clusters.len();

            for (i, det) in batch {
                let to_base =
                    self.best(&det, &base_targets, false, |_| true, &mut out.ambiguous);
                let mut replaced_candidate = None;
                if let Some((m, k)) = to_base {
                    match m.change {
                        Some(RoadChange::Replaced) => replaced_candidate = Some((k, m)),
                        change => {
                            out.attach(k, i, Some(year));
                            out.note_change(k, change);
                            out.matches.push(m);
                            continue;
                        }
                    }
                }

                let confident = det.feature.confidence.unwrap_or(1.0)
                    >= self.config.temporal.min_detection_confidence;
                if !can_seed || !confident {
                    out.discarded += 1;
                    continue;
                }

                let joined = self.best(
                    &det,
                    &rep_targets,
                    false,
                    |c| matches!(c, RoadChange::Unchanged | RoadChange::Widened),
                    &mut out.ambiguous,
                );
                let object = match joined {
                    Some((m, c)) => {
                        let object = clusters[c].object;
                        out.attach(object, i, Some(year));
                        out.matches.push(m);
                        clusters[c].representative = det;
                        object
                    }
                    None => {
                        let mut seed =
                            FusedObject::new(det.id().clone(), ObjectOrigin::Historical, i);
                        seed.first_seen = Some(year);
                        let object = out.push(seed);
                        if det.geometry.as_line().is_some() {
                            out.road_change[object] = Some(RoadChange::Demolished);
                        }
                        clusters.push(Cluster {
                            object,
                            representative: det,
                        });
                        object
                    }
                };

                if let Some((k, m)) = replaced_candidate
                    && out.objects[object].replaced_by_road.is_none()
                {
                    out.objects[object].replaced_by_road = Some((base[k].id().clone(), m));
                }
            }
            log::debug!(
                "Snapshot {} ({}): {} historical clusters seeded",
                snapshot.id,
                year,
                clusters.len() - seeded_before
            );
        }

        let reps: Vec<ProjectedFeature<'a>> =
            clusters.iter().map(|c| c.representative.clone()).collect();
        let rep_targets = Targets::new(&reps);
        for (i, record) in orphans {
            let found = self.best(
                &record,
                &rep_targets,
                true,
                |c| c.is_same_road(),
                &mut out.ambiguous,
            );
            match found {
                Some((m, c)) => {
                    out.attach(clusters[c].object, i, None);
                    out.matches.push(m);
                    out.orphans_reattached += 1;
                }
                None => {
                    out.push(FusedObject::new(
                        record.id().clone(),
                        ObjectOrigin::Registry,
                        i,
                    ));
                }
            }
        }

        out
    }
}

/// Seed working features and move the assembly into the context.
fn install(ctx: &mut FusionContext, config: &FusionConfig, assembly: Assembly) {
    let Assembly {
        objects,
        road_change,
        matches,
        orphans,
        orphans_reattached,
        ambiguous,
        discarded,
    } = assembly;

    let mut seeded: Vec<(FusedObject, Feature)> = Vec::with_capacity(objects.len());
    for (object, change) in objects.into_iter().zip(road_change) {
        let ranked = rank_members(&ctx.catalog, &config.priority, &ctx.inputs, &object.members);
        let Some(mut feature) = seed_feature(&object.id, &ranked) else {
            continue;
        };
        feature.change = change;
        seeded.push((object, feature));
    }

    // Baseline roads with no historical counterpart in a snapshot that
    // would have found them
    let snapshots: Vec<SourceId> = ctx
        .catalog
        .snapshots()
        .into_iter()
        .filter(|d| d.find_strength >= Strength::Medium)
        .map(|d| d.id.clone())
        .collect();
    for (object, feature) in &mut seeded {
        if object.origin == ObjectOrigin::Baseline
            && feature.change.is_none()
            && feature.geometry.class() == GeometryClass::Line
            && snapshots.iter().any(|s| ctx.covers(s, feature))
        {
            feature.change = Some(RoadChange::New);
        }
    }

    for (object, feature) in seeded {
        ctx.push_object(object, feature);
    }

    let report = &mut ctx.report;
    report.input.discarded_detections = discarded;
    report.matching.record(&matches);
    report.matching.orphans = orphans;
    report.matching.orphans_reattached = orphans_reattached;
    report.matching.ambiguous = ambiguous;
    report.matching.historical_objects = ctx
        .objects
        .iter()
        .filter(|o| o.origin == ObjectOrigin::Historical)
        .count();

    log::info!(
        "Spatial matching: {} objects ({} historical), {} matches, {} orphans ({} reattached)",
        ctx.objects.len(),
        report.matching.historical_objects,
        matches.len(),
        orphans,
        orphans_reattached
    );
    ctx.matches = matches;
}
