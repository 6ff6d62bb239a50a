//! Top-level FusionConfig and YAML loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::inheritance::InheritanceConfig;
use crate::matching::{FootprintMatchConfig, PointMatchConfig, RoadMatchConfig};
use crate::merge::PriorityConfig;
use crate::replacement::ReplacementConfig;
use crate::temporal::TemporalConfig;

use super::error::{ConfigError, ConfigLoadError};

/// Full fusion configuration loaded from YAML.
///
/// Immutable once validated; the engine threads it through every stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct FusionConfig {
    /// Registry point to footprint matching
    #[serde(default)]
    pub point_match: PointMatchConfig,

    /// Polygon IoU matching
    #[serde(default)]
    pub footprint_match: FootprintMatchConfig,

    /// Road shape matching
    #[serde(default)]
    pub road_match: RoadMatchConfig,

    /// Temporal inference
    #[serde(default)]
    pub temporal: TemporalConfig,

    /// Replacement detection
    #[serde(default)]
    pub replacement: ReplacementConfig,

    /// Date inheritance
    #[serde(default)]
    pub inheritance: InheritanceConfig,

    /// Source priority ordering
    #[serde(default)]
    pub priority: PriorityConfig,
}

impl FusionConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/fusion.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/fusion.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        serde_yaml::to_string(self).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Check every section. Runs before any matching.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.point_match.validate()?;
        self.footprint_match.validate()?;
        self.road_match.validate()?;
        self.temporal.validate()?;
        self.replacement.validate()?;
        self.inheritance.validate()?;
        Ok(())
    }

    /// Builder-style setter for the point-match section.
    pub fn with_point_match(mut self, config: PointMatchConfig) -> Self {
        self.point_match = config;
        self
    }

    /// Builder-style setter for the road-match section.
    pub fn with_road_match(mut self, config: RoadMatchConfig) -> Self {
        self.road_match = config;
        self
    }

    /// Builder-style setter for the temporal section.
    pub fn with_temporal(mut self, config: TemporalConfig) -> Self {
        self.temporal = config;
        self
    }

    /// Builder-style setter for the replacement section.
    pub fn with_replacement(mut self, config: ReplacementConfig) -> Self {
        self.replacement = config;
        self
    }

    /// Builder-style setter for the inheritance section.
    pub fn with_inheritance(mut self, config: InheritanceConfig) -> Self {
        self.inheritance = config;
        self
    }

    /// Builder-style setter for the priority section.
    pub fn with_priority(mut self, config: PriorityConfig) -> Self {
        self.priority = config;
        self
    }

    /// Override the baseline year.
    pub fn with_baseline_year(mut self, year: i32) -> Self {
        self.temporal.baseline_year = year;
        self
    }
}
