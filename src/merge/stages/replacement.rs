//! Replacement stage: links superseded objects to their successors.
//!
//! Passes run oldest first so each object is replaced by its nearest
//! successor: historical objects first seen in year Y against older
//! historical objects, then all historical objects against the baseline.
//! Objects already replaced are not offered to later passes.

use std::collections::BTreeSet;

use crate::config::FusionConfig;
use crate::core::RoadChange;
use crate::error::Result;
use crate::matching::project_all;
use crate::merge::context::{FusionContext, ObjectOrigin};
use crate::merge::pipeline::{Artifact, Stage};
use crate::replacement::{LinkKind, ReplacementDetector, ReplacementLink, ReplacementOutcome};

/// Replacement detection stage.
pub struct ReplacementStage;

impl Stage for ReplacementStage {
    fn name(&self) -> &'static str {
        "replacement_detection"
    }

    fn requires(&self) -> &'static [Artifact] {
        &[Artifact::TemporalBounds]
    }

    fn produces(&self) -> &'static [Artifact] {
        &[Artifact::Replacements]
    }

    fn run(&self, ctx: &mut FusionContext, config: &FusionConfig) -> Result<()> {
        let detector = ReplacementDetector::new(config.replacement.clone());
        let mut totals = ReplacementOutcome::default();

        let historical: Vec<usize> = (0..ctx.objects.len())
            .filter(|&i| ctx.objects[i].origin != ObjectOrigin::Baseline)
            .collect();
        let years: BTreeSet<i32> = historical
            .iter()
            .filter_map(|&i| ctx.objects[i].first_seen)
            .collect();

        for year in years {
            let earlier: Vec<usize> = historical
                .iter()
                .copied()
                .filter(|&i| ctx.objects[i].first_seen.is_some_and(|y| y < year))
                .filter(|&i| ctx.features[i].replaced_by.is_empty())
                .collect();
            let later: Vec<usize> = historical
                .iter()
                .copied()
                .filter(|&i| ctx.objects[i].first_seen == Some(year))
                .collect();
            let outcome = detect(ctx, &detector, &earlier, &later, year);
            apply(ctx, &outcome.links);
            totals.merge(outcome);
        }

        let earlier: Vec<usize> = historical
            .iter()
            .copied()
            .filter(|&i| ctx.features[i].replaced_by.is_empty())
            .collect();
        let later: Vec<usize> = (0..ctx.objects.len())
            .filter(|&i| ctx.objects[i].origin == ObjectOrigin::Baseline)
            .collect();
        let baseline_year = ctx.baseline_year;
        let outcome = detect(ctx, &detector, &earlier, &later, baseline_year);
        apply(ctx, &outcome.links);
        totals.merge(outcome);

        // Historical roads classified `replaced` against a baseline road
        let mut road_links = Vec::new();
        for &i in &historical {
            let Some((new_id, road_match)) = &ctx.objects[i].replaced_by_road else {
                continue;
            };
            let Some(j) = ctx.object(new_id) else {
                continue;
            };
            match detector.road_link(&ctx.features[i], &ctx.features[j], road_match, baseline_year)
            {
                Some(link) => road_links.push(link),
                None => totals.rejected_by_era += 1,
            }
        }
        apply(ctx, &road_links);

        let report = &mut ctx.report.replacement;
        report.links = ctx.graph.len();
        report.road_links = road_links.len();
        report.rejected_by_era = totals.rejected_by_era;
        report.rejected_by_overlap = totals.rejected_by_overlap;

        log::info!(
            "Replacement detection: {} links ({} roads), {} rejected by era gate, {} by overlap",
            report.links,
            report.road_links,
            report.rejected_by_era,
            report.rejected_by_overlap
        );
        Ok(())
    }
}

fn detect(
    ctx: &FusionContext,
    detector: &ReplacementDetector,
    earlier: &[usize],
    later: &[usize],
    reference_year: i32,
) -> ReplacementOutcome {
    if earlier.is_empty() || later.is_empty() {
        return ReplacementOutcome::default();
    }
    let earlier = project_all(&ctx.frame, earlier.iter().map(|&i| &ctx.features[i]));
    let later = project_all(&ctx.frame, later.iter().map(|&i| &ctx.features[i]));
    detector.detect(&earlier, &later, reference_year)
}

fn apply(ctx: &mut FusionContext, links: &[ReplacementLink]) {
    for link in links {
        let (Some(old), Some(new)) = (ctx.object(&link.old), ctx.object(&link.new)) else {
            continue;
        };
        if !ctx.graph.add(link.clone()) {
            continue;
        }
        link.apply_to_old(&mut ctx.features[old]);
        link.apply_to_new(&mut ctx.features[new]);
        if link.kind == LinkKind::Road {
            ctx.features[old].change = Some(RoadChange::Replaced);
        }
        log::debug!(
            "{} replaced by {} (overlap {:.2}, end {})",
            link.old,
            link.new,
            link.overlap,
            link.end_year
        );
    }
}
