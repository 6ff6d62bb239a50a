//! Benchmark road shape comparison and batch road matching.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use itihas::core::{Feature, FeatureClass, FeatureType, GeoPoint, Geometry, LocalPoint};
use itihas::matching::{RoadMatchConfig, RoadMatcher, project_all};
use itihas::spatial::LocalFrame;

const M: f64 = 1.0 / 111_195.0;

/// Gently curving polyline of `n` vertices, `step` meters apart.
fn curve(n: usize, step: f64, offset: f64) -> Vec<LocalPoint> {
    (0..n)
        .map(|i| {
            let x = i as f64 * step;
            LocalPoint::new(x, offset + 20.0 * (x / 150.0).sin())
        })
        .collect()
}

/// Grid of east-west roads, one every 60 m.
fn road_grid(source: &str, rows: usize, offset: f64) -> Vec<Feature> {
    (0..rows)
        .map(|r| {
            let y = r as f64 * 60.0 + offset;
            let points = (0..10)
                .map(|i| GeoPoint::new(i as f64 * 40.0 * M, y * M))
                .collect();
            Feature::new(
                format!("{source}:r{r}"),
                source,
                FeatureClass::empty(FeatureType::Road),
                Geometry::LineString(points),
            )
        })
        .collect()
}

fn bench_compare(c: &mut Criterion) {
    let matcher = RoadMatcher::new(RoadMatchConfig::default());
    let mut group = c.benchmark_group("road_compare");

    for length in [10, 50, 200] {
        let a = curve(length, 10.0, 0.0);
        let b = curve(length, 10.0, 6.0);
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |bench, _| {
            bench.iter(|| black_box(matcher.compare(black_box(&a), black_box(&b))))
        });
    }

    group.finish();
}

fn bench_match_roads(c: &mut Criterion) {
    let matcher = RoadMatcher::new(RoadMatchConfig::default());
    let frame = LocalFrame::default();
    let historical = road_grid("map-1880", 100, 4.0);
    let modern = road_grid("osm", 100, 0.0);
    let historical = project_all(&frame, historical.iter());
    let modern = project_all(&frame, modern.iter());

    c.bench_function("match_roads_100x100", |b| {
        b.iter(|| black_box(matcher.match_roads(black_box(&historical), black_box(&modern))))
    });
}

criterion_group!(benches, bench_compare, bench_match_roads);
criterion_main!(benches);
