//! Merge orchestration: runs the matchers, inference, replacement detection
//! and date inheritance in sequence, then resolves multi-source attributes.
//!
//! - [`FusionEngine`]: validated entry point for one batch run
//! - [`Pipeline`]: typed stage sequence, ordering checked at construction
//! - [`FusionContext`]: state shared by the stages
//! - [`PriorityConfig`]: source priority ranks

mod context;
mod engine;
mod pipeline;
mod priority;
mod quality;
mod resolve;
pub mod stages;

pub use context::{FusedObject, FusionContext, ObjectOrigin};
pub use engine::{FusionEngine, FusionInput, FusionOutput};
pub use pipeline::{Artifact, Pipeline, Stage};
pub use priority::{PriorityConfig, RolePriorities};
pub use quality::quality_tier;
pub use resolve::{RankedMember, rank_members, resolve_attributes, select_geometry};
