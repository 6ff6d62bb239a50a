//! Replacement detection and the replacement link graph.
//!
//! - [`ReplacementDetector`]: finds earlier features superseded on the same footprint
//! - [`ReplacementGraph`]: `old -> new` links with lazy chain traversal

mod detector;
mod graph;

pub use detector::{EraGate, ReplacementConfig, ReplacementDetector, ReplacementOutcome};
pub use graph::{LinkKind, ReplacementChain, ReplacementGraph, ReplacementLink};
