//! Error types for Itihas

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, ConfigLoadError};
use crate::core::SourceId;
use crate::merge::Artifact;

/// Pipeline construction error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A stage runs before the artifact it needs is produced.
    #[error("stage `{stage}` requires {artifact:?}, which no earlier stage produces")]
    MissingInput {
        /// Offending stage
        stage: &'static str,
        /// Artifact it requires
        artifact: Artifact,
    },

    /// The same stage appears twice.
    #[error("stage `{0}` appears more than once")]
    DuplicateStage(&'static str),
}

/// Unreadable or invalid input files.
#[derive(Error, Debug)]
pub enum InputError {
    /// File could not be read or written.
    #[error("cannot access {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Manifest is not valid YAML or misses required fields.
    #[error("invalid manifest {path}: {reason}")]
    Manifest {
        /// Manifest path
        path: PathBuf,
        /// What is wrong
        reason: String,
    },

    /// Document is valid JSON but not a FeatureCollection.
    #[error("{0} is not a GeoJSON FeatureCollection")]
    NotFeatureCollection(String),

    /// Feature references a source missing from the catalog.
    #[error("feature source `{0}` is not declared")]
    UnknownSource(SourceId),

    /// Two sources share an id.
    #[error("source `{0}` declared twice")]
    DuplicateSource(SourceId),
}

/// Umbrella error for the fusion engine.
#[derive(Error, Debug)]
pub enum FusionError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration file could not be loaded
    #[error(transparent)]
    ConfigLoad(#[from] ConfigLoadError),

    /// Invalid stage ordering
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Unreadable or invalid input
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Itihas result type.
pub type Result<T> = std::result::Result<T, FusionError>;

/// An input feature that was skipped. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedFeature {
    /// Source the feature came from
    pub source: SourceId,
    /// Position in the source's feature collection
    pub index: usize,
    /// Why it was skipped
    pub reason: String,
}

impl MalformedFeature {
    /// Record a skipped feature and log it.
    pub fn new(source: impl Into<SourceId>, index: usize, reason: impl Into<String>) -> Self {
        let m = Self {
            source: source.into(),
            index,
            reason: reason.into(),
        };
        log::warn!(
            "Skipping feature #{} of source {}: {}",
            m.index,
            m.source,
            m.reason
        );
        m
    }
}
