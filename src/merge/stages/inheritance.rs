//! Date inheritance stage.

use crate::config::FusionConfig;
use crate::error::Result;
use crate::inheritance::DateInheritance;
use crate::merge::context::FusionContext;
use crate::merge::pipeline::{Artifact, Stage};

/// Dates every object still lacking a start date.
pub struct InheritanceStage;

impl Stage for InheritanceStage {
    fn name(&self) -> &'static str {
        "date_inheritance"
    }

    fn requires(&self) -> &'static [Artifact] {
        &[Artifact::TemporalBounds, Artifact::Replacements]
    }

    fn produces(&self) -> &'static [Artifact] {
        &[Artifact::InheritedDates]
    }

    fn run(&self, ctx: &mut FusionContext, config: &FusionConfig) -> Result<()> {
        let stats =
            DateInheritance::new(config.inheritance.clone()).apply(&ctx.frame, &mut ctx.features);

        let report = &mut ctx.report.inheritance;
        report.inherited = stats.inherited;
        report.fallback = stats.fallback;
        report.mean_donor_distance_m = stats.mean_donor_distance_m();

        log::info!(
            "Date inheritance: {} inherited, {} fallback",
            stats.inherited,
            stats.fallback
        );
        Ok(())
    }
}
