//! Core types for the fusion engine.
//!
//! - [`GeoPoint`] / [`LocalPoint`]: geographic and projected coordinates
//! - [`GeoBounds`]: lon/lat bounding box
//! - [`Geometry`]: point, polyline, or polygon
//! - [`Feature`] and [`FeatureClass`]: typed feature model
//! - [`SourceDescriptor`] / [`SourceCatalog`]: per-source metadata
//! - [`Provenance`]: attribute-level provenance side-table

mod bounds;
mod feature;
mod geometry;
mod point;
mod provenance;
mod source;

pub use bounds::GeoBounds;
pub use feature::{
    DateKind, Evidence, Feature, FeatureClass, FeatureId, FeatureType, QualityTier, RoadChange,
    SourceId,
};
pub use geometry::{Geometry, GeometryClass};
pub use point::{GeoPoint, LocalPoint};
pub use provenance::{Provenance, ProvenanceEntry};
pub use source::{SourceCatalog, SourceDescriptor, SourceRole, Strength};
