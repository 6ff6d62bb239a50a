//! Source priority ranks (lower rank wins).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::config::ConfigError;
use crate::core::{SourceCatalog, SourceId, SourceRole};

/// Default rank per source role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RolePriorities {
    /// Default: 0
    #[serde(default = "defaults::priority_registry")]
    pub registry: u8,
    /// Default: 1
    #[serde(default = "defaults::priority_municipal_record")]
    pub municipal_record: u8,
    /// Default: 2
    #[serde(default = "defaults::priority_verified_detection")]
    pub verified_detection: u8,
    /// Default: 3
    #[serde(default = "defaults::priority_baseline")]
    pub baseline: u8,
    /// Default: 4
    #[serde(default = "defaults::priority_unverified_detection")]
    pub unverified_detection: u8,
}

impl Default for RolePriorities {
    fn default() -> Self {
        Self {
            registry: defaults::priority_registry(),
            municipal_record: defaults::priority_municipal_record(),
            verified_detection: defaults::priority_verified_detection(),
            baseline: defaults::priority_baseline(),
            unverified_detection: defaults::priority_unverified_detection(),
        }
    }
}

impl RolePriorities {
    /// Rank for a role.
    pub fn for_role(&self, role: SourceRole) -> u8 {
        match role {
            SourceRole::Registry => self.registry,
            SourceRole::MunicipalRecord => self.municipal_record,
            SourceRole::VerifiedDetection => self.verified_detection,
            SourceRole::Baseline => self.baseline,
            SourceRole::UnverifiedDetection => self.unverified_detection,
        }
    }
}

/// Source priority ordering.
///
/// Resolution order: per-source override, then the descriptor's own
/// priority, then the role default. Unknown sources rank last.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Rank per role
    #[serde(default)]
    pub roles: RolePriorities,

    /// Explicit rank per source id
    #[serde(default)]
    pub overrides: BTreeMap<SourceId, u8>,
}

impl PriorityConfig {
    /// Builder-style setter for one source override.
    pub fn with_override(mut self, source: impl Into<SourceId>, rank: u8) -> Self {
        self.overrides.insert(source.into(), rank);
        self
    }

    /// Rank of a source.
    pub fn rank(&self, catalog: &SourceCatalog, source: &str) -> u8 {
        if let Some(&rank) = self.overrides.get(source) {
            return rank;
        }
        match catalog.get(source) {
            Some(d) => d.priority.unwrap_or_else(|| self.roles.for_role(d.role)),
            None => u8::MAX,
        }
    }

    /// Every override must name a declared source.
    pub fn validate_sources(&self, catalog: &SourceCatalog) -> Result<(), ConfigError> {
        match self.overrides.keys().find(|id| catalog.get(id).is_none()) {
            Some(id) => Err(ConfigError::UnknownSource {
                source_id: id.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceDescriptor;

    fn catalog() -> SourceCatalog {
        [
            SourceDescriptor::new("reg", SourceRole::Registry),
            SourceDescriptor::new("osm", SourceRole::Baseline),
            SourceDescriptor::new("det", SourceRole::UnverifiedDetection).with_priority(1),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_rank_resolution_order() {
        let catalog = catalog();
        let config = PriorityConfig::default().with_override("osm", 9);
        assert_eq!(config.rank(&catalog, "reg"), 0);
        assert_eq!(config.rank(&catalog, "det"), 1);
        assert_eq!(config.rank(&catalog, "osm"), 9);
        assert_eq!(config.rank(&catalog, "missing"), u8::MAX);
    }

    #[test]
    fn test_unknown_override_rejected() {
        let config = PriorityConfig::default().with_override("nope", 0);
        assert_eq!(
            config.validate_sources(&catalog()),
            Err(ConfigError::UnknownSource {
                source_id: "nope".to_string()
            })
        );
    }
}
