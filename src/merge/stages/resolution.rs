//! Conflict resolution stage: final attributes, quality tiers and order.

use crate::config::FusionConfig;
use crate::error::Result;
use crate::merge::context::FusionContext;
use crate::merge::pipeline::{Artifact, Stage};
use crate::merge::quality::quality_tier;
use crate::merge::resolve::{rank_members, resolve_attributes};
use crate::report::OutputReport;

/// Resolves multi-source attributes and assigns quality tiers.
pub struct ConflictResolution;

impl Stage for ConflictResolution {
    fn name(&self) -> &'static str {
        "conflict_resolution"
    }

    fn requires(&self) -> &'static [Artifact] {
        &[Artifact::Matches, Artifact::TemporalBounds]
    }

    fn produces(&self) -> &'static [Artifact] {
        &[Artifact::ResolvedFeatures]
    }

    fn run(&self, ctx: &mut FusionContext, config: &FusionConfig) -> Result<()> {
        for (object, feature) in ctx.objects.iter().zip(ctx.features.iter_mut()) {
            let ranked = rank_members(&ctx.catalog, &config.priority, &ctx.inputs, &object.members);
            resolve_attributes(feature, &ranked);
            feature.quality_tier = Some(quality_tier(feature, object.bounds.as_ref()));
        }
        ctx.sort_by_id();

        ctx.report.output = OutputReport::summarize(&ctx.features);
        log::info!(
            "Conflict resolution: {} features, tiers {:?}",
            ctx.report.output.features,
            ctx.report.output.by_tier
        );
        Ok(())
    }
}
