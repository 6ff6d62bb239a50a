//! Temporal inference: bounding object lifetimes from partial observations.
//!
//! The orchestrator builds one [`TemporalChain`] per object from registry
//! records, snapshot presence/absence and the baseline, then asks the
//! [`TemporalEngine`] for [`TemporalBounds`].

mod chain;
mod config;
mod inference;
mod policy;

pub use chain::{Observation, ObservationKind, TemporalChain};
pub use config::TemporalConfig;
pub use inference::{StartRule, TemporalBounds, TemporalEngine};
pub use policy::TransitionPolicy;
