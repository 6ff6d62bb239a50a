//! # Itihas
//!
//! Temporal fusion of geospatial feature observations.
//!
//! ## Overview
//!
//! Itihas merges observations of buildings, roads, water bodies and land use
//! from heterogeneous sources into one temporally bounded feature set:
//!
//! - **Registries** - authoritative records with exact dates
//! - **Baseline** - a modern, complete but undated map
//! - **Map snapshots** - machine detections from historical map sheets,
//!   each with a survey year and a confidence score
//!
//! Every output feature carries a `start_date`/`end_date` estimate, an
//! evidence level, a quality tier and attribute-level provenance.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use itihas::{FusionConfig, FusionEngine};
//! use itihas::io::{Manifest, write_collection};
//! use std::path::Path;
//!
//! let engine = FusionEngine::new(FusionConfig::default())?;
//! let input = Manifest::load(Path::new("demos/manifest.yaml"))?.read_input()?;
//! let output = engine.run(input)?;
//!
//! write_collection(&output.features, Path::new("fused.geojson"))?;
//! println!("{}", output.report.to_json()?);
//! ```
//!
//! ## Pipeline
//!
//! ```text
//!   per-source FeatureCollections
//!                │
//!                ▼
//!   ┌────────────────────────┐
//!   │   Spatial matching     │  points→footprints, IoU, road shape
//!   └───────────┬────────────┘
//!               ▼
//!   ┌────────────────────────┐
//!   │  Temporal inference    │  registry > snapshots > baseline absence
//!   └───────────┬────────────┘
//!               ▼
//!   ┌────────────────────────┐
//!   │ Replacement detection  │  overlap + era-gated evidence
//!   └───────────┬────────────┘
//!               ▼
//!   ┌────────────────────────┐
//!   │   Date inheritance     │  nearest high-evidence donor, fallback
//!   └───────────┬────────────┘
//!               ▼
//!   ┌────────────────────────┐
//!   │  Conflict resolution   │  priority ranks, provenance, quality tier
//!   └───────────┬────────────┘
//!               ▼
//!     fused features + report
//! ```
//!
//! ## Coordinates
//!
//! Input and output use WGS84 lon/lat degrees. Metric computations run in a
//! local equirectangular frame centred on the inputs ([`spatial::LocalFrame`]).

pub mod config;
pub mod core;
pub mod error;
pub mod inheritance;
pub mod io;
pub mod matching;
pub mod merge;
pub mod replacement;
pub mod report;
pub mod spatial;
pub mod temporal;

pub use config::{ConfigError, ConfigLoadError, FusionConfig};

pub use core::{
    DateKind, Evidence, Feature, FeatureClass, FeatureId, FeatureType, GeoBounds, GeoPoint,
    Geometry, QualityTier, RoadChange, SourceCatalog, SourceDescriptor, SourceId, SourceRole,
    Strength,
};

pub use error::{FusionError, InputError, MalformedFeature, PipelineError, Result};

pub use merge::{FusionEngine, FusionInput, FusionOutput, Pipeline, Stage};

pub use replacement::{ReplacementGraph, ReplacementLink};

pub use report::FusionReport;
