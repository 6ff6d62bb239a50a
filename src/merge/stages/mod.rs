//! The five standard pipeline stages.

mod inheritance;
mod matching;
mod replacement;
mod resolution;
mod temporal;

pub use inheritance::InheritanceStage;
pub use matching::SpatialMatching;
pub use replacement::ReplacementStage;
pub use resolution::ConflictResolution;
pub use temporal::TemporalInference;
