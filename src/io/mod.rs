//! Input and output files.
//!
//! - **GeoJSON**: per-source FeatureCollections in, the fused collection out
//! - **Manifest**: YAML list of sources with their roles and files
//!
//! ```rust,ignore
//! use itihas::io::{Manifest, write_collection};
//! use std::path::Path;
//!
//! let input = Manifest::load(Path::new("demos/manifest.yaml"))?.read_input()?;
//! let output = engine.run(input)?;
//! write_collection(&output.features, Path::new("fused.geojson"))?;
//! ```

pub mod geojson;
pub mod manifest;

pub use geojson::{
    SourceFeatures, feature_to_json, parse_collection, parse_feature, read_collection,
    to_collection, write_collection,
};
pub use manifest::{Manifest, SourceEntry};
