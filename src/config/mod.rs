//! Configuration loading for Itihas.
//!
//! Every tunable lives in one YAML file. Component configs are defined next
//! to the components that use them and composed here as sections.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use itihas::config::FusionConfig;
//!
//! // Load from default path (configs/fusion.yaml), or built-in defaults
//! let config = FusionConfig::load_default()?;
//! config.validate()?;
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | `point_match` | Registry point to footprint buffer and near distance |
//! | `footprint_match` | IoU thresholds for polygon matching |
//! | `road_match` | Sampling, LSS threshold, classification cutoffs |
//! | `temporal` | Baseline year, transition policy, detection confidence |
//! | `replacement` | Overlap ratio, era gates |
//! | `inheritance` | Donor radius, fallback years |
//! | `priority` | Role priorities and per-source overrides |
//!
//! ## Example YAML
//!
//! ```yaml
//! point_match:
//!   buffer_m: 20.0
//! road_match:
//!   sample_interval_m: 5.0
//!   match_threshold_m: 10.0
//! temporal:
//!   transition_policy: midpoint
//! replacement:
//!   era_gates:
//!     - { until_year: 1899, min_evidence: high }
//!     - { until_year: 1950, min_evidence: medium }
//! priority:
//!   overrides:
//!     cadastre: 0
//! ```

pub(crate) mod defaults;
mod error;
mod fusion;

pub use error::{ConfigError, ConfigLoadError};
pub use fusion::FusionConfig;

pub(crate) use error::{ensure_non_negative, ensure_positive, ensure_unit};
