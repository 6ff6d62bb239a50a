//! End-to-end fusion scenarios.

mod common;

use approx::assert_relative_eq;
use common::*;
use itihas::config::ConfigError;
use itihas::inheritance::InheritanceConfig;
use itihas::matching::{MatchConfidence, MatchKind};
use itihas::merge::stages::{SpatialMatching, TemporalInference};
use itihas::replacement::LinkKind;
use itihas::{
    DateKind, Evidence, FusionConfig, FusionEngine, FusionError, FusionInput, PipelineError,
    QualityTier, RoadChange, SourceDescriptor, SourceRole, Stage,
};
use serde_json::json;

// ============================================================================
// Registry placement
// ============================================================================

#[test]
fn test_registry_point_in_polygon_is_gold() {
    let output = fuse(
        catalog([registry(), baseline(), sheet("map-1880", 1880)]),
        vec![
            registered(building("reg:1", point(10.0, 10.0)), 1875),
            building("osm:b1", rect(0.0, 0.0, 20.0, 20.0)),
            detected(building("map-1880:d1", rect(0.5, 0.0, 20.0, 20.0)), 0.9),
        ],
    );
    assert_output_invariants(&output);
    assert_eq!(output.features.len(), 1);

    let f = find(&output, "osm:b1");
    assert_eq!(f.start_date, Some(1875));
    assert_eq!(f.evidence, Some(Evidence::High));
    assert_eq!(f.date_kind, Some(DateKind::Exact));
    assert_eq!(f.end_date, None);
    assert_eq!(f.quality_tier, Some(QualityTier::Gold));
    assert_eq!(f.all_sources, vec!["reg", "osm", "map-1880"]);
    assert_eq!(f.provenance.get("start_date").unwrap().source, "reg");

    let placed = output
        .matches
        .iter()
        .find(|m| m.kind == MatchKind::PointInPolygon)
        .unwrap();
    assert_eq!(placed.observation, "reg:1");
    assert_eq!(placed.target, "osm:b1");
    assert_eq!(placed.confidence, MatchConfidence::High);
}

#[test]
fn test_registry_date_later_than_snapshot_is_a_conflict() {
    let output = fuse(
        catalog([registry(), baseline(), sheet("map-1880", 1880)]),
        vec![
            registered(building("reg:1", point(10.0, 10.0)), 1900),
            building("osm:b1", rect(0.0, 0.0, 20.0, 20.0)),
            detected(building("map-1880:d1", rect(0.0, 0.0, 20.0, 20.0)), 0.9),
        ],
    );

    let f = find(&output, "osm:b1");
    assert_eq!(f.start_date, Some(1900));
    assert_eq!(output.report.temporal.date_conflicts, 1);
}

#[test]
fn test_unplaced_registry_record_is_its_own_feature() {
    let output = fuse(
        catalog([registry(), baseline()]),
        vec![
            registered(building("reg:9", point(600.0, 600.0)), 1920),
            building("osm:b1", rect(0.0, 0.0, 20.0, 20.0)),
        ],
    );

    assert_eq!(output.report.matching.orphans, 1);
    let f = find(&output, "reg:9");
    assert_eq!(f.start_date, Some(1920));
    assert_eq!(f.quality_tier, Some(QualityTier::Bronze));
}

#[test]
fn test_registry_record_reattaches_to_historical_footprint() {
    let output = fuse(
        catalog([registry(), baseline(), sheet("map-1880", 1880)]),
        vec![
            registered(building("reg:5", point(500.0, 500.0)), 1850).with_end(1960),
            building("osm:b1", rect(0.0, 0.0, 20.0, 20.0)),
            detected(building("map-1880:old", square(500.0, 500.0, 12.0)), 0.9),
        ],
    );

    assert_eq!(output.report.matching.orphans, 1);
    assert_eq!(output.report.matching.orphans_reattached, 1);
    let f = find(&output, "map-1880:old");
    assert_eq!(f.start_date, Some(1850));
    assert_eq!(f.end_date, Some(1960));
    assert!(f.demolished);
}

#[test]
fn test_id_tie_breaks_are_counted_as_ambiguous() {
    let output = fuse(
        catalog([baseline(), sheet("map-1880", 1880)]),
        vec![
            building("osm:a", square(499.0, 0.0, 10.0)),
            building("osm:b", square(501.0, 0.0, 10.0)),
            road("osm:r1", line(&[(0.0, 3.0), (100.0, 3.0)])),
            road("osm:r2", line(&[(0.0, -3.0), (100.0, -3.0)])),
            detected(building("map-1880:b", square(500.0, 0.0, 10.0)), 0.9),
            detected(road("map-1880:r", line(&[(0.0, 0.0), (100.0, 0.0)])), 0.9),
        ],
    );
    assert_output_invariants(&output);

    assert_eq!(find(&output, "osm:a").start_date, Some(1880));
    assert_eq!(find(&output, "osm:r1").start_date, Some(1880));
    assert_eq!(find(&output, "osm:r1").change, Some(RoadChange::Unchanged));
    assert_eq!(output.report.matching.ambiguous, 2);
}

// ============================================================================
// Roads
// ============================================================================

#[test]
fn test_parallel_roads_are_widened() {
    let output = fuse(
        catalog([baseline(), sheet("map-1880", 1880)]),
        vec![
            road("osm:r1", line(&[(0.0, 0.0), (100.0, 0.0)])),
            detected(road("map-1880:r1", line(&[(0.0, 8.0), (100.0, 8.0)])), 0.9),
        ],
    );
    assert_output_invariants(&output);

    let f = find(&output, "osm:r1");
    assert_eq!(f.change, Some(RoadChange::Widened));
    assert_eq!(f.start_date, Some(1880));
    assert_eq!(f.date_kind, Some(DateKind::NotLaterThan));
    assert_eq!(f.evidence, Some(Evidence::Medium));

    let m = output
        .matches
        .iter()
        .find(|m| m.kind == MatchKind::RoadShape)
        .unwrap();
    assert_eq!(m.change, Some(RoadChange::Widened));
    assert_relative_eq!(m.score, 1.0, epsilon = 1e-9);
    assert_relative_eq!(m.distance_m, 8.0, epsilon = 0.1);
    assert_eq!(output.report.matching.road_matches.get("widened"), Some(&1));
}

#[test]
fn test_unmatched_roads_are_demolished_and_new() {
    let output = fuse(
        catalog([baseline(), sheet("map-1880", 1880)]),
        vec![
            road("osm:r1", line(&[(0.0, 0.0), (100.0, 0.0)])),
            detected(road("map-1880:r9", line(&[(0.0, 300.0), (100.0, 300.0)])), 0.9),
        ],
    );
    assert_output_invariants(&output);

    let modern = find(&output, "osm:r1");
    assert_eq!(modern.change, Some(RoadChange::New));
    assert_eq!(modern.start_date, Some(1952));
    assert_eq!(modern.date_kind, Some(DateKind::Inferred));
    assert_eq!(modern.evidence, Some(Evidence::Low));

    let old = find(&output, "map-1880:r9");
    assert_eq!(old.change, Some(RoadChange::Demolished));
    assert!(old.demolished);
    assert_eq!(old.start_date, Some(1880));
    assert_eq!(old.end_date, Some(1952));
}

// ============================================================================
// Replacement
// ============================================================================

#[test]
fn test_historical_building_replaced_by_baseline() {
    let output = fuse(
        catalog([baseline(), sheet("map-1880", 1880), survey("map-1925", 1925)]),
        vec![
            building("osm:new", square(15.0, 15.0, 30.0)),
            detected(building("map-1880:old", square(15.0, 15.0, 12.0)), 0.9),
            detected(building("map-1925:old", square(15.0, 15.0, 12.0)), 0.9),
        ],
    );
    assert_output_invariants(&output);
    assert_eq!(output.features.len(), 2);

    let old = find(&output, "map-1880:old");
    assert_eq!(old.start_date, Some(1880));
    assert_eq!(old.evidence, Some(Evidence::High));
    assert_eq!(old.end_date, Some(1974));
    assert!(old.demolished);
    assert_eq!(old.replaced_by, vec!["osm:new"]);

    let new = find(&output, "osm:new");
    assert_eq!(new.start_date, Some(1974));
    assert_eq!(new.date_kind, Some(DateKind::Inferred));
    assert_eq!(new.replaces, vec!["map-1880:old"]);
    assert_eq!(new.quality_tier, Some(QualityTier::Inferred));

    assert!(output.replacements.contains("map-1880:old", "osm:new"));
    assert_eq!(output.report.replacement.links, 1);
    assert_eq!(output.report.matching.historical_objects, 1);
}

#[test]
fn test_replacement_chain_is_recovered() {
    let output = fuse(
        catalog([baseline(), sheet("map-1905", 1905), survey("map-1925", 1925)]),
        vec![
            detected(building("map-1905:a", square(15.0, 15.0, 12.0)), 0.9),
            detected(building("map-1925:b", square(15.0, 15.0, 20.0)), 0.9),
            building("osm:c", square(15.0, 15.0, 30.0)),
        ],
    );
    assert_output_invariants(&output);

    let chain: Vec<String> = output.replacements.chain_from("map-1905:a").collect();
    assert_eq!(chain, vec!["map-1905:a", "map-1925:b", "osm:c"]);

    let a = find(&output, "map-1905:a");
    assert!(a.end_date.is_some_and(|end| end <= 1925));
    let b = find(&output, "map-1925:b");
    assert_eq!(b.replaces, vec!["map-1905:a"]);
    assert_eq!(b.replaced_by, vec!["osm:c"]);
}

#[test]
fn test_rebuilt_road_links_to_baseline_detour() {
    let straight = &[(0.0, 0.0), (200.0, 0.0)];
    let output = fuse(
        catalog([baseline(), sheet("map-1905", 1905), survey("map-1925", 1925)]),
        vec![
            road("osm:r", line(&[(0.0, 0.0), (0.0, 60.0), (200.0, 60.0), (200.0, 0.0)])),
            detected(road("map-1905:r", line(straight)), 0.9),
            detected(road("map-1925:r", line(straight)), 0.9),
        ],
    );
    assert_output_invariants(&output);
    assert_eq!(output.features.len(), 2);

    let old = find(&output, "map-1905:r");
    assert_eq!(old.start_date, Some(1905));
    assert_eq!(old.evidence, Some(Evidence::High));
    assert_eq!(old.change, Some(RoadChange::Replaced));
    assert_eq!(old.end_date, Some(1974));
    assert!(old.demolished);
    assert_eq!(old.replaced_by, vec!["osm:r"]);

    let new = find(&output, "osm:r");
    assert_eq!(new.replaces, vec!["map-1905:r"]);

    let links = output.replacements.links();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].kind, LinkKind::Road);
    assert_eq!(links[0].end_year, 1974);
    assert!(links[0].overlap < 0.5);
    assert_eq!(output.report.replacement.road_links, 1);
    assert_eq!(output.report.replacement.rejected_by_era, 0);
}

#[test]
fn test_road_link_rejected_by_era_gate() {
    // One 1880 sheet gives medium evidence; pre-1900 links need high
    let output = fuse(
        catalog([baseline(), sheet("map-1880", 1880)]),
        vec![
            road("osm:r", line(&[(0.0, 0.0), (0.0, 60.0), (200.0, 60.0), (200.0, 0.0)])),
            detected(road("map-1880:r", line(&[(0.0, 0.0), (200.0, 0.0)])), 0.9),
        ],
    );
    assert_output_invariants(&output);

    let old = find(&output, "map-1880:r");
    assert_eq!(old.evidence, Some(Evidence::Medium));
    assert_eq!(old.change, Some(RoadChange::Demolished));
    assert!(old.replaced_by.is_empty());
    assert!(find(&output, "osm:r").replaces.is_empty());

    assert!(output.replacements.links().is_empty());
    assert_eq!(output.report.replacement.road_links, 0);
    assert_eq!(output.report.replacement.rejected_by_era, 1);
}

#[test]
fn test_short_detour_is_not_a_replacement() {
    // LSS stays above 0.5 while the detour sits 25 m off the old line
    let straight = &[(0.0, 0.0), (200.0, 0.0)];
    let detour = &[
        (0.0, 0.0),
        (80.0, 0.0),
        (90.0, 25.0),
        (110.0, 25.0),
        (120.0, 0.0),
        (200.0, 0.0),
    ];
    let output = fuse(
        catalog([baseline(), sheet("map-1905", 1905), survey("map-1925", 1925)]),
        vec![
            road("osm:r", line(detour)),
            detected(road("map-1905:r", line(straight)), 0.9),
            detected(road("map-1925:r", line(straight)), 0.9),
        ],
    );
    assert_output_invariants(&output);

    let old = find(&output, "map-1905:r");
    assert_eq!(old.change, Some(RoadChange::Demolished));
    assert!(old.replaced_by.is_empty());
    assert!(output.replacements.links().is_empty());
    assert_eq!(output.report.replacement.road_links, 0);
}

// ============================================================================
// Inheritance
// ============================================================================

#[test]
fn test_undated_feature_inherits_from_registry_donor() {
    let output = fuse(
        catalog([registry(), baseline()]),
        vec![
            registered(building("reg:1", point(10.0, 10.0)), 1875),
            building("osm:b1", rect(0.0, 0.0, 20.0, 20.0)),
            building("osm:b4", rect(200.0, 0.0, 20.0, 20.0)),
        ],
    );
    assert_output_invariants(&output);

    let f = find(&output, "osm:b4");
    assert_eq!(f.start_date, Some(1875));
    assert_eq!(f.evidence, Some(Evidence::Low));
    assert_eq!(f.date_kind, Some(DateKind::Inferred));
    assert_eq!(f.quality_tier, Some(QualityTier::Inferred));

    let p = f.provenance.get("start_date").unwrap();
    assert_eq!(p.donor.as_deref(), Some("osm:b1"));
    assert_relative_eq!(p.distance_m.unwrap(), 200.0, epsilon = 1.0);
    assert_eq!(output.report.inheritance.inherited, 1);
    assert_eq!(output.report.temporal.undated, 1);
}

#[test]
fn test_fallback_years_without_donor() {
    let output = fuse(
        catalog([baseline()]),
        vec![
            building("osm:b1", rect(0.0, 0.0, 20.0, 20.0)),
            road("osm:r1", line(&[(0.0, 50.0), (100.0, 50.0)])),
        ],
    );
    assert_output_invariants(&output);

    let b = find(&output, "osm:b1");
    assert_eq!(b.start_date, Some(1960));
    assert_eq!(b.date_kind, Some(DateKind::Fallback));
    assert_eq!(b.evidence, Some(Evidence::Low));
    assert_eq!(find(&output, "osm:r1").start_date, Some(2000));
    assert_eq!(output.report.inheritance.fallback, 2);
}

// ============================================================================
// Conflict resolution
// ============================================================================

#[test]
fn test_attributes_resolved_by_priority() {
    let mut reg = registered(building("reg:1", point(10.0, 10.0)), 1875);
    reg.class.set_subtype(Some("church".into()));
    let mut osm = building("osm:b1", rect(0.0, 0.0, 20.0, 20.0));
    osm.class.set_subtype(Some("place_of_worship".into()));
    osm.extra.insert("roof".into(), json!("gabled"));
    let mut det = detected(building("map-1880:d1", rect(0.0, 0.0, 20.0, 20.0)), 0.9);
    det.extra.insert("roof".into(), json!("flat"));

    let output = fuse(
        catalog([registry(), baseline(), sheet("map-1880", 1880)]),
        vec![reg, osm, det],
    );

    let f = find(&output, "osm:b1");
    assert_eq!(f.class.subtype(), Some("church"));
    assert_eq!(f.extra.get("roof"), Some(&json!("gabled")));
    assert!(f.geometry.vertices().len() > 1);

    let subtype = f.provenance.get("subtype").unwrap();
    assert_eq!(subtype.source, "reg");
    assert_eq!(subtype.contributors, vec!["reg", "osm"]);
    assert_eq!(f.provenance.get("extra.roof").unwrap().source, "osm");
}

#[test]
fn test_priority_override_changes_winner() {
    let mut config = FusionConfig::default();
    config.priority = config.priority.with_override("map-1880", 0);

    let mut osm = building("osm:b1", rect(0.0, 0.0, 20.0, 20.0));
    osm.extra.insert("roof".into(), json!("gabled"));
    let mut det = detected(building("map-1880:d1", rect(0.0, 0.0, 20.0, 20.0)), 0.9);
    det.extra.insert("roof".into(), json!("flat"));

    let output = fuse_with(
        config,
        catalog([baseline(), sheet("map-1880", 1880)]),
        vec![osm, det],
    );
    let f = find(&output, "osm:b1");
    assert_eq!(f.extra.get("roof"), Some(&json!("flat")));
    assert_eq!(f.all_sources, vec!["map-1880", "osm"]);
}

// ============================================================================
// Input handling and errors
// ============================================================================

#[test]
fn test_malformed_and_low_confidence_inputs_are_skipped() {
    let output = fuse(
        catalog([baseline(), sheet("map-1880", 1880)]),
        vec![
            building("osm:b1", rect(0.0, 0.0, 20.0, 20.0)),
            building("osm:b1", rect(50.0, 0.0, 20.0, 20.0)),
            building("ghost:1", rect(100.0, 0.0, 20.0, 20.0)),
            detected(building("map-1880:faint", rect(300.0, 300.0, 10.0, 10.0)), 0.2),
        ],
    );

    assert_eq!(output.features.len(), 1);
    assert_eq!(output.report.input.skipped.len(), 2);
    assert_eq!(output.report.input.discarded_detections, 1);
    assert_eq!(output.report.input.features_per_source.get("osm"), Some(&1));
}

#[test]
fn test_negative_radius_rejected_before_matching() {
    let config = FusionConfig::default()
        .with_inheritance(InheritanceConfig::default().with_max_radius(-10.0));

    match FusionEngine::new(config) {
        Err(FusionError::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, "inheritance.max_radius_m");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("negative radius accepted"),
    }
}

#[test]
fn test_out_of_order_stages_rejected() {
    let stages: Vec<Box<dyn Stage>> = vec![Box::new(TemporalInference), Box::new(SpatialMatching)];
    let result = FusionEngine::with_stages(FusionConfig::default(), stages);
    assert!(matches!(
        result,
        Err(FusionError::Pipeline(PipelineError::MissingInput {
            stage: "temporal_inference",
            ..
        }))
    ));
}

#[test]
fn test_snapshot_without_reference_year_rejected() {
    let engine = FusionEngine::new(FusionConfig::default()).unwrap();
    let input = FusionInput::new(
        catalog([
            baseline(),
            SourceDescriptor::new("map-x", SourceRole::UnverifiedDetection),
        ]),
        vec![building("osm:b1", rect(0.0, 0.0, 20.0, 20.0))],
    );

    match engine.run(input) {
        Err(FusionError::Config(ConfigError::MissingReferenceYear { source_id })) => {
            assert_eq!(source_id, "map-x");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("missing reference year accepted"),
    }
}

#[test]
fn test_empty_input() {
    let output = fuse(catalog([baseline()]), Vec::new());
    assert!(output.features.is_empty());
    assert!(output.replacements.is_empty());
    assert_eq!(output.report.output.features, 0);
}
