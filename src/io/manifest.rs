//! Source manifest: the YAML file declaring every input of a run.
//!
//! ```yaml
//! sources:
//!   - id: registry
//!     role: registry
//!     path: registry.geojson
//!   - id: osm
//!     role: baseline
//!     path: osm.geojson
//!     reference_year: 2024
//!   - id: map-1880
//!     role: unverified_detection
//!     path: detections_1880.geojson
//!     reference_year: 1880
//!     map_source: survey-sheet-12
//!     coverage: [10.0, 50.0, 10.05, 50.03]
//! ```
//!
//! Paths are relative to the manifest. Strengths default by role.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{GeoBounds, SourceCatalog, SourceDescriptor, SourceId, SourceRole, Strength};
use crate::error::InputError;
use crate::merge::FusionInput;

use super::geojson::read_collection;

/// One declared source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Source id, used as feature id prefix
    pub id: SourceId,
    /// Source role
    pub role: SourceRole,
    /// GeoJSON file, relative to the manifest
    pub path: PathBuf,
    /// Priority rank override (lower wins)
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub find_strength: Option<Strength>,
    #[serde(default)]
    pub verify_strength: Option<Strength>,
    /// Survey year of a map snapshot
    #[serde(default)]
    pub reference_year: Option<i32>,
    /// Independence key for snapshot confirmations
    #[serde(default)]
    pub map_source: Option<String>,
    /// `[min_lon, min_lat, max_lon, max_lat]`
    #[serde(default)]
    pub coverage: Option<[f64; 4]>,
}

impl SourceEntry {
    /// Descriptor with role defaults filled in.
    pub fn descriptor(&self) -> SourceDescriptor {
        let mut d = SourceDescriptor::new(self.id.clone(), self.role);
        d.priority = self.priority;
        d.find_strength = self.find_strength.unwrap_or(d.find_strength);
        d.verify_strength = self.verify_strength.unwrap_or(d.verify_strength);
        d.reference_year = self.reference_year;
        d.map_source = self.map_source.clone();
        d.coverage = self.coverage.map(GeoBounds::from_array);
        d
    }
}

/// Parsed manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Declared sources
    pub sources: Vec<SourceEntry>,
    /// Directory source paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Manifest {
    /// Load a manifest file.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = fs::read_to_string(path).map_err(|e| InputError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_yaml(&text, base_dir).map_err(|e| match e {
            InputError::Manifest { reason, .. } => InputError::Manifest {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse manifest YAML; paths resolve against `base_dir`.
    pub fn from_yaml(yaml: &str, base_dir: impl Into<PathBuf>) -> Result<Self, InputError> {
        let invalid = |reason: String| InputError::Manifest {
            path: PathBuf::from("<inline>"),
            reason,
        };
        let mut manifest: Manifest =
            serde_yaml::from_str(yaml).map_err(|e| invalid(e.to_string()))?;
        manifest.base_dir = base_dir.into();

        if manifest.sources.is_empty() {
            return Err(invalid("no sources declared".to_string()));
        }
        let mut ids = BTreeSet::new();
        for s in &manifest.sources {
            if !ids.insert(s.id.as_str()) {
                return Err(InputError::DuplicateSource(s.id.clone()));
            }
            if s.id.is_empty() || s.id.contains(':') {
                return Err(invalid(format!("invalid source id `{}`", s.id)));
            }
            if let Some([min_lon, min_lat, max_lon, max_lat]) = s.coverage
                && (min_lon > max_lon || min_lat > max_lat)
            {
                return Err(invalid(format!("source `{}` has inverted coverage", s.id)));
            }
        }
        Ok(manifest)
    }

    /// Catalog of all declared sources.
    pub fn catalog(&self) -> SourceCatalog {
        self.sources.iter().map(SourceEntry::descriptor).collect()
    }

    /// Absolute or manifest-relative path of a source file.
    pub fn resolve(&self, entry: &SourceEntry) -> PathBuf {
        if entry.path.is_absolute() {
            entry.path.clone()
        } else {
            self.base_dir.join(&entry.path)
        }
    }

    /// Read every source file into one fusion input.
    pub fn read_input(&self) -> Result<FusionInput, InputError> {
        let mut input = FusionInput::new(self.catalog(), Vec::new());
        for entry in &self.sources {
            let parsed = read_collection(&entry.id, &self.resolve(entry))?;
            input.features.extend(parsed.features);
            input.malformed.extend(parsed.malformed);
        }
        Ok(input)
    }
}
