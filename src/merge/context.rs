//! Shared state threaded through the pipeline stages.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::FusionConfig;
use crate::core::{Feature, FeatureId, FeatureType, GeoBounds, SourceCatalog, SourceId, SourceRole};
use crate::error::MalformedFeature;
use crate::matching::Match;
use crate::replacement::ReplacementGraph;
use crate::report::FusionReport;
use crate::spatial::LocalFrame;
use crate::temporal::TemporalBounds;

use super::pipeline::Artifact;

/// How a fused object entered the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectOrigin {
    /// Anchored on a baseline feature
    Baseline,
    /// Seen only in historical snapshots
    Historical,
    /// Registry record placed on no footprint
    Registry,
}

/// One real-world object and the input observations describing it.
#[derive(Clone, Debug)]
pub struct FusedObject {
    /// Output feature id
    pub id: FeatureId,
    /// How the object entered the run
    pub origin: ObjectOrigin,
    /// Input positions of every member observation
    pub members: Vec<usize>,
    /// Earliest snapshot year among members
    pub first_seen: Option<i32>,
    /// Baseline road counterpart classified `replaced`
    pub replaced_by_road: Option<(FeatureId, Match)>,
    /// Inferred lifetime
    pub bounds: Option<TemporalBounds>,
}

impl FusedObject {
    /// Object with a single anchoring member.
    pub fn new(id: FeatureId, origin: ObjectOrigin, member: usize) -> Self {
        Self {
            id,
            origin,
            members: vec![member],
            first_seen: None,
            replaced_by_road: None,
            bounds: None,
        }
    }
}

/// Working state of one fusion run.
///
/// `objects[i]` and `features[i]` describe the same object; the feature is
/// the output being assembled.
pub struct FusionContext {
    /// Declared sources
    pub catalog: SourceCatalog,
    /// Accepted input observations
    pub inputs: Vec<Feature>,
    /// Local metric frame around all inputs
    pub frame: LocalFrame,
    /// Year of the modern baseline
    pub baseline_year: i32,
    /// Area each source covers
    pub coverage: BTreeMap<SourceId, GeoBounds>,
    /// Feature types each source reports
    pub source_types: BTreeMap<SourceId, BTreeSet<FeatureType>>,
    /// Fused objects
    pub objects: Vec<FusedObject>,
    /// Output features, parallel to `objects`
    pub features: Vec<Feature>,
    /// Object position by id
    pub object_index: BTreeMap<FeatureId, usize>,
    /// All matches found
    pub matches: Vec<Match>,
    /// Replacement links
    pub graph: ReplacementGraph,
    /// Run statistics
    pub report: FusionReport,
    produced: BTreeSet<Artifact>,
}

impl FusionContext {
    /// Validate and ingest the inputs.
    ///
    /// Features with invalid geometry, an undeclared source or a duplicate
    /// id are skipped and reported.
    pub fn new(
        catalog: SourceCatalog,
        features: Vec<Feature>,
        mut malformed: Vec<MalformedFeature>,
        config: &FusionConfig,
    ) -> Self {
        let mut inputs = Vec::with_capacity(features.len());
        let mut seen = BTreeSet::new();
        let mut per_source: BTreeMap<SourceId, usize> = BTreeMap::new();

        for (position, f) in features.into_iter().enumerate() {
            let reason = if catalog.get(&f.source).is_none() {
                Some(format!("undeclared source `{}`", f.source))
            } else if let Err(reason) = f.geometry.validate() {
                Some(reason.to_string())
            } else if !seen.insert(f.id.clone()) {
                Some(format!("duplicate id `{}`", f.id))
            } else {
                None
            };
            match reason {
                Some(reason) => malformed.push(MalformedFeature::new(f.source, position, reason)),
                None => {
                    *per_source.entry(f.source.clone()).or_default() += 1;
                    inputs.push(f);
                }
            }
        }

        let mut all = GeoBounds::empty();
        let mut coverage: BTreeMap<SourceId, GeoBounds> = BTreeMap::new();
        let mut source_types: BTreeMap<SourceId, BTreeSet<FeatureType>> = BTreeMap::new();
        for f in &inputs {
            let b = f.geometry.bounds();
            all.merge(&b);
            coverage.entry(f.source.clone()).or_default().merge(&b);
            source_types
                .entry(f.source.clone())
                .or_default()
                .insert(f.feature_type());
        }
        for d in catalog.iter() {
            if let Some(declared) = d.coverage {
                coverage.insert(d.id.clone(), declared);
            }
        }

        let baseline_year = catalog
            .iter()
            .filter(|d| d.role == SourceRole::Baseline)
            .find_map(|d| d.reference_year)
            .unwrap_or(config.temporal.baseline_year);

        let frame = if all.is_empty() {
            LocalFrame::default()
        } else {
            LocalFrame::for_bounds(&all)
        };

        let mut report = FusionReport::default();
        report.input.features_per_source = per_source;
        report.input.skipped = malformed;

        log::info!(
            "Ingested {} features from {} sources ({} skipped), baseline year {}",
            inputs.len(),
            catalog.len(),
            report.input.skipped.len(),
            baseline_year
        );

        Self {
            catalog,
            inputs,
            frame,
            baseline_year,
            coverage,
            source_types,
            objects: Vec::new(),
            features: Vec::new(),
            object_index: BTreeMap::new(),
            matches: Vec::new(),
            graph: ReplacementGraph::new(),
            report,
            produced: BTreeSet::from([Artifact::Inputs]),
        }
    }

    /// Role of an input's source.
    pub fn role_of(&self, input: usize) -> Option<SourceRole> {
        self.catalog.role(&self.inputs[input].source)
    }

    /// Add an object with its working feature.
    pub fn push_object(&mut self, object: FusedObject, feature: Feature) -> usize {
        let i = self.objects.len();
        self.object_index.insert(object.id.clone(), i);
        self.objects.push(object);
        self.features.push(feature);
        i
    }

    /// Position of an object by id.
    pub fn object(&self, id: &str) -> Option<usize> {
        self.object_index.get(id).copied()
    }

    /// Whether `source` covers `feature`'s location and reports its type.
    pub fn covers(&self, source: &str, feature: &Feature) -> bool {
        let reports_type = self
            .source_types
            .get(source)
            .is_some_and(|types| types.contains(&feature.feature_type()));
        reports_type
            && self
                .coverage
                .get(source)
                .is_some_and(|b| b.contains(feature.geometry.representative_point()))
    }

    /// Reorder objects and features by id.
    pub fn sort_by_id(&mut self) {
        let mut order: Vec<usize> = (0..self.objects.len()).collect();
        order.sort_by(|&a, &b| self.objects[a].id.cmp(&self.objects[b].id));

        let mut objects: Vec<Option<FusedObject>> = self.objects.drain(..).map(Some).collect();
        let mut features: Vec<Option<Feature>> = self.features.drain(..).map(Some).collect();
        for i in order {
            if let (Some(o), Some(f)) = (objects[i].take(), features[i].take()) {
                self.objects.push(o);
                self.features.push(f);
            }
        }
        self.object_index = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id.clone(), i))
            .collect();
    }

    /// Mark an artifact as available.
    pub fn mark_produced(&mut self, artifact: Artifact) {
        self.produced.insert(artifact);
    }

    /// Whether an artifact is available.
    pub fn has(&self, artifact: Artifact) -> bool {
        self.produced.contains(&artifact)
    }
}
