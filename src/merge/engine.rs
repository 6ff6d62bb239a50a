//! Fusion engine: validated entry point for one batch run.

use crate::config::{ConfigError, FusionConfig};
use crate::core::{Feature, SourceCatalog};
use crate::error::{MalformedFeature, PipelineError, Result};
use crate::matching::Match;
use crate::replacement::ReplacementGraph;
use crate::report::FusionReport;

use super::context::FusionContext;
use super::pipeline::{Pipeline, Stage};

/// Everything one run consumes.
#[derive(Clone, Debug, Default)]
pub struct FusionInput {
    /// Declared sources
    pub catalog: SourceCatalog,
    /// Observations from every source
    pub features: Vec<Feature>,
    /// Features already rejected while reading
    pub malformed: Vec<MalformedFeature>,
}

impl FusionInput {
    /// Input without read-time rejects.
    pub fn new(catalog: SourceCatalog, features: Vec<Feature>) -> Self {
        Self {
            catalog,
            features,
            malformed: Vec::new(),
        }
    }
}

/// Everything one run produces.
#[derive(Clone, Debug)]
pub struct FusionOutput {
    /// Unified features, sorted by id
    pub features: Vec<Feature>,
    /// Replacement links between output features
    pub replacements: ReplacementGraph,
    /// Every match found
    pub matches: Vec<Match>,
    /// Run statistics
    pub report: FusionReport,
}

/// Runs the fusion pipeline with an immutable configuration.
pub struct FusionEngine {
    config: FusionConfig,
    pipeline: Pipeline,
}

impl FusionEngine {
    /// Engine with the standard pipeline. Fails on invalid configuration.
    pub fn new(config: FusionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pipeline: Pipeline::standard(),
        })
    }

    /// Engine with a custom stage sequence.
    pub fn with_stages(config: FusionConfig, stages: Vec<Box<dyn Stage>>) -> Result<Self> {
        config.validate()?;
        let pipeline = Pipeline::new(stages).map_err(|e: PipelineError| {
            log::error!("Rejected pipeline: {e}");
            e
        })?;
        Ok(Self { config, pipeline })
    }

    /// Engine configuration.
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Source-level checks: snapshot sources need a reference year and
    /// priority overrides must name declared sources.
    pub fn validate_catalog(
        &self,
        catalog: &SourceCatalog,
    ) -> std::result::Result<(), ConfigError> {
        if let Some(d) = catalog
            .iter()
            .find(|d| d.role.is_snapshot() && d.reference_year.is_none())
        {
            return Err(ConfigError::MissingReferenceYear {
                source_id: d.id.clone(),
            });
        }
        self.config.priority.validate_sources(catalog)
    }

    /// Fuse one batch.
    pub fn run(&self, input: FusionInput) -> Result<FusionOutput> {
        self.validate_catalog(&input.catalog)?;

        let mut ctx =
            FusionContext::new(input.catalog, input.features, input.malformed, &self.config);
        self.pipeline.run(&mut ctx, &self.config)?;

        log::info!(
            "Fusion complete: {} features, {} replacement links",
            ctx.features.len(),
            ctx.graph.len()
        );
        Ok(FusionOutput {
            features: ctx.features,
            replacements: ctx.graph,
            matches: ctx.matches,
            report: ctx.report,
        })
    }
}
