//! Configuration errors.

use thiserror::Error;

/// Config load error
#[derive(Error, Debug, Clone)]
pub enum ConfigLoadError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(String),
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Invalid configuration, detected before any matching runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric parameter is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidValue {
        /// Parameter path, e.g. `inheritance.max_radius_m`
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A map-snapshot source has no reference year.
    #[error("snapshot source `{source_id}` must declare a reference_year")]
    MissingReferenceYear {
        /// Offending source
        source_id: String,
    },

    /// A priority override names a source that is not in the catalog.
    #[error("priority override for unknown source `{source_id}`")]
    UnknownSource {
        /// Offending source
        source_id: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject negative or NaN values.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < 0.0 {
        return Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

/// Reject zero, negative or NaN values.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value <= 0.0 {
        return Err(ConfigError::invalid(field, format!("must be > 0, got {value}")));
    }
    Ok(())
}

/// Reject values outside `[0, 1]`.
pub(crate) fn ensure_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("must be within [0, 1], got {value}"),
        ));
    }
    Ok(())
}
