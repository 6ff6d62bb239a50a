//! Fixtures for Itihas integration tests.
//!
//! Scenes are laid out in meters around lon/lat (0, 0), where one degree is
//! close enough to 111.195 km in both directions.

#![allow(dead_code)]

use itihas::{
    DateKind, Evidence, Feature, FeatureClass, FeatureType, FusionConfig, FusionEngine,
    FusionInput, FusionOutput, GeoBounds, GeoPoint, Geometry, SourceCatalog, SourceDescriptor,
    SourceRole,
};

/// One meter in degrees.
pub const M: f64 = 1.0 / 111_195.0;

pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

pub fn geo(x: f64, y: f64) -> GeoPoint {
    GeoPoint::new(x * M, y * M)
}

/// Axis-aligned rectangle with its south-west corner at (x, y).
pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Geometry {
    Geometry::Polygon(vec![
        geo(x, y),
        geo(x + w, y),
        geo(x + w, y + h),
        geo(x, y + h),
        geo(x, y),
    ])
}

/// Square of side `side` centred on (cx, cy).
pub fn square(cx: f64, cy: f64, side: f64) -> Geometry {
    rect(cx - side / 2.0, cy - side / 2.0, side, side)
}

pub fn point(x: f64, y: f64) -> Geometry {
    Geometry::Point(geo(x, y))
}

pub fn line(coords: &[(f64, f64)]) -> Geometry {
    Geometry::LineString(coords.iter().map(|&(x, y)| geo(x, y)).collect())
}

pub fn building(id: &str, geometry: Geometry) -> Feature {
    let source = id.split(':').next().unwrap_or(id);
    Feature::new(id, source, FeatureClass::empty(FeatureType::Building), geometry)
}

pub fn road(id: &str, geometry: Geometry) -> Feature {
    let source = id.split(':').next().unwrap_or(id);
    Feature::new(id, source, FeatureClass::empty(FeatureType::Road), geometry)
}

/// Detection with a confidence score.
pub fn detected(feature: Feature, confidence: f64) -> Feature {
    feature.with_confidence(confidence)
}

/// Registry record with an exact start year.
pub fn registered(feature: Feature, year: i32) -> Feature {
    feature.with_start(year, DateKind::Exact, Evidence::High)
}

/// A 2 km square around the origin.
pub fn scene_coverage() -> GeoBounds {
    GeoBounds::new(geo(-1000.0, -1000.0), geo(1000.0, 1000.0))
}

pub fn registry() -> SourceDescriptor {
    SourceDescriptor::new("reg", SourceRole::Registry)
}

pub fn baseline() -> SourceDescriptor {
    SourceDescriptor::new("osm", SourceRole::Baseline)
        .with_reference_year(2024)
        .with_coverage(scene_coverage())
}

/// Unverified snapshot sheet covering the whole scene.
pub fn sheet(id: &str, year: i32) -> SourceDescriptor {
    SourceDescriptor::new(id, SourceRole::UnverifiedDetection)
        .with_reference_year(year)
        .with_map_source(format!("{id}-sheet"))
        .with_coverage(scene_coverage())
}

/// Verified snapshot survey covering the whole scene.
pub fn survey(id: &str, year: i32) -> SourceDescriptor {
    SourceDescriptor::new(id, SourceRole::VerifiedDetection)
        .with_reference_year(year)
        .with_map_source(format!("{id}-survey"))
        .with_coverage(scene_coverage())
}

pub fn catalog(sources: impl IntoIterator<Item = SourceDescriptor>) -> SourceCatalog {
    sources.into_iter().collect()
}

/// Fuse with the default configuration.
pub fn fuse(catalog: SourceCatalog, features: Vec<Feature>) -> FusionOutput {
    fuse_with(FusionConfig::default(), catalog, features)
}

pub fn fuse_with(
    config: FusionConfig,
    catalog: SourceCatalog,
    features: Vec<Feature>,
) -> FusionOutput {
    init_logging();
    let engine = FusionEngine::new(config).expect("valid config");
    engine
        .run(FusionInput::new(catalog, features))
        .expect("fusion run")
}

/// Output feature by id.
pub fn find<'a>(output: &'a FusionOutput, id: &str) -> &'a Feature {
    output
        .features
        .iter()
        .find(|f| f.id == id)
        .unwrap_or_else(|| panic!("no output feature `{id}`"))
}

/// Properties every output must satisfy.
pub fn assert_output_invariants(output: &FusionOutput) {
    for f in &output.features {
        assert!(f.dates_consistent(), "{}: start after end", f.id);
        if f.date_kind == Some(DateKind::Fallback) {
            assert_eq!(f.evidence, Some(Evidence::Low), "{}: fallback not low", f.id);
        }
    }
    let ids: Vec<&str> = output.features.iter().map(|f| f.id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted, "output not sorted by id");
}
