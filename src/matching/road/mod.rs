//! Road shape matching.
//!
//! Both lines are sampled at a fixed arc-length interval, then compared by
//! the longest similar subsequence (LSS) ratio and the symmetric Hausdorff
//! distance. The pair of metrics decides the change classification.

mod classify;
mod hausdorff;
mod lss;
mod matcher;

pub use classify::{RoadComparison, classify};
pub use hausdorff::{directed_hausdorff, hausdorff};
pub use lss::{lss_length, lss_ratio};
pub use matcher::{RoadMatchOutcome, RoadMatcher};
