//! Quality tier assignment.

use crate::core::{DateKind, Feature, QualityTier};
use crate::temporal::TemporalBounds;

/// Tier for a resolved feature.
///
/// - `gold`: registry record plus at least one independent confirmation
/// - `silver`: two or more agreeing sources
/// - `bronze`: a single authoritative source
/// - `inferred`: derived or fallback date only
pub fn quality_tier(feature: &Feature, bounds: Option<&TemporalBounds>) -> QualityTier {
    match (feature.start_date, feature.date_kind) {
        (None, _) | (_, None) | (_, Some(DateKind::Inferred)) | (_, Some(DateKind::Fallback)) => {
            return QualityTier::Inferred;
        }
        _ => {}
    }
    let Some(bounds) = bounds else {
        return QualityTier::Bronze;
    };
    let registry = bounds.registry_sources.len();
    if registry > 0 && bounds.independent_confirmations >= 1 {
        QualityTier::Gold
    } else if registry + bounds.independent_confirmations >= 2 {
        QualityTier::Silver
    } else {
        QualityTier::Bronze
    }
}
