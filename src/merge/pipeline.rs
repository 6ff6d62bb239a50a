//! Typed stage sequence with ordering checked at construction.

use std::collections::BTreeSet;

use crate::config::FusionConfig;
use crate::error::{PipelineError, Result};

use super::context::FusionContext;
use super::stages::{
    ConflictResolution, InheritanceStage, ReplacementStage, SpatialMatching, TemporalInference,
};

/// Data a stage consumes or produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Artifact {
    /// Validated input features and source catalog
    Inputs,
    /// Fused objects and their matches
    Matches,
    /// Lifetime bounds per object
    TemporalBounds,
    /// Replacement links applied
    Replacements,
    /// Undated objects dated by inheritance
    InheritedDates,
    /// Final attributes, provenance and quality tiers
    ResolvedFeatures,
}

/// One step of the fusion run.
pub trait Stage {
    /// Stage name for logs and errors.
    fn name(&self) -> &'static str;

    /// Artifacts that must exist before the stage runs.
    fn requires(&self) -> &'static [Artifact];

    /// Artifacts the stage makes available.
    fn produces(&self) -> &'static [Artifact];

    /// Run the stage.
    fn run(&self, ctx: &mut FusionContext, config: &FusionConfig) -> Result<()>;
}

/// Ordered stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Check the ordering: every requirement must be produced by an
    /// earlier stage (or be the inputs).
    pub fn new(stages: Vec<Box<dyn Stage>>) -> std::result::Result<Self, PipelineError> {
        let mut available = BTreeSet::from([Artifact::Inputs]);
        let mut names = BTreeSet::new();
        for stage in &stages {
            if !names.insert(stage.name()) {
                return Err(PipelineError::DuplicateStage(stage.name()));
            }
            if let Some(&artifact) = stage.requires().iter().find(|a| !available.contains(a)) {
                return Err(PipelineError::MissingInput {
                    stage: stage.name(),
                    artifact,
                });
            }
            available.extend(stage.produces().iter().copied());
        }
        Ok(Self { stages })
    }

    /// matching -> temporal inference -> replacement -> inheritance ->
    /// conflict resolution
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Box::new(SpatialMatching),
                Box::new(TemporalInference),
                Box::new(ReplacementStage),
                Box::new(InheritanceStage),
                Box::new(ConflictResolution),
            ],
        }
    }

    /// Stage names in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order.
    pub fn run(&self, ctx: &mut FusionContext, config: &FusionConfig) -> Result<()> {
        for stage in &self.stages {
            if let Some(&artifact) = stage.requires().iter().find(|&&a| !ctx.has(a)) {
                return Err(PipelineError::MissingInput {
                    stage: stage.name(),
                    artifact,
                }
                .into());
            }
            log::debug!("Running stage {}", stage.name());
            stage.run(ctx, config)?;
            for &artifact in stage.produces() {
                ctx.mark_produced(artifact);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order_is_valid() {
        let standard = Pipeline::standard();
        let rebuilt = Pipeline::new(vec![
            Box::new(SpatialMatching),
            Box::new(TemporalInference),
            Box::new(ReplacementStage),
            Box::new(InheritanceStage),
            Box::new(ConflictResolution),
        ])
        .unwrap();
        assert_eq!(standard.stage_names(), rebuilt.stage_names());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let err = Pipeline::new(vec![Box::new(TemporalInference), Box::new(SpatialMatching)])
            .err()
            .unwrap();
        assert_eq!(
            err,
            PipelineError::MissingInput {
                stage: "temporal_inference",
                artifact: Artifact::Matches,
            }
        );
    }

    #[test]
    fn test_inheritance_before_replacement_rejected() {
        let err = Pipeline::new(vec![
            Box::new(SpatialMatching),
            Box::new(TemporalInference),
            Box::new(InheritanceStage),
            Box::new(ReplacementStage),
        ])
        .err()
        .unwrap();
        assert!(matches!(
            err,
            PipelineError::MissingInput {
                stage: "date_inheritance",
                artifact: Artifact::Replacements,
            }
        ));
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let err = Pipeline::new(vec![Box::new(SpatialMatching), Box::new(SpatialMatching)])
            .err()
            .unwrap();
        assert_eq!(err, PipelineError::DuplicateStage("spatial_matching"));
    }
}
