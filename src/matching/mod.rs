//! Spatial matching between features of different sources.
//!
//! - [`PointPolygonMatcher`]: registry points onto footprints
//! - [`FootprintMatcher`]: polygons onto polygons by IoU
//! - [`RoadMatcher`]: historical roads onto modern roads by shape
//!
//! All matchers are pure functions of their input and configuration, and
//! return [`Match`] relations rather than mutating features.

mod config;
mod footprint;
mod point_polygon;
pub mod road;
mod types;

pub use config::{FootprintMatchConfig, PointMatchConfig, RoadMatchConfig};
pub use footprint::{FootprintMatchOutcome, FootprintMatcher};
pub use point_polygon::{PointMatchOutcome, PointPolygonMatcher};
pub use road::{RoadComparison, RoadMatchOutcome, RoadMatcher};
pub use types::{
    Match, MatchConfidence, MatchKind, ProjectedFeature, Selection, build_index, project_all,
};
