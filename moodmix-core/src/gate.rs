//! Confidence gating
//!
//! Demotes low-confidence or taxonomy-violating classifications to the
//! default label. Pure and total.

use std::sync::Arc;

use crate::taxonomy::{MoodLabel, Taxonomy};
use crate::types::{ClassificationResult, Source};

/// Threshold applied when none is configured (0-100 scale)
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone)]
pub struct ConfidenceGate {
    taxonomy: Arc<Taxonomy>,
    threshold: f32,
}

impl ConfidenceGate {
    pub fn new(taxonomy: Arc<Taxonomy>, threshold: f32) -> Self {
        Self {
            taxonomy,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Gate one classification down to a stable label.
    ///
    /// Fallback results pass through unchanged (they carry no confidence to
    /// judge). Model results below the threshold are demoted to the default
    /// label regardless of what was parsed. Labels outside the taxonomy are
    /// rewritten to the default in either case.
    pub fn gate(&self, result: &ClassificationResult) -> MoodLabel {
        if !self.taxonomy.contains(&result.label) {
            return self.taxonomy.default_label().clone();
        }
        match result.source {
            Source::Fallback => result.label.clone(),
            Source::Model if result.confidence < self.threshold => {
                tracing::debug!(
                    label = %result.label,
                    confidence = result.confidence,
                    threshold = self.threshold,
                    "low confidence, demoting to default"
                );
                self.taxonomy.default_label().clone()
            }
            Source::Model => result.label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ConfidenceGate {
        ConfidenceGate::new(Arc::new(Taxonomy::basic()), DEFAULT_CONFIDENCE_THRESHOLD)
    }

    #[test]
    fn test_low_confidence_demoted_regardless_of_label() {
        let gate = gate();
        for label in ["happy", "sad", "angry"] {
            let result = ClassificationResult::model(MoodLabel::new(label), 49.9);
            assert_eq!(gate.gate(&result), MoodLabel::new("neutral"));
        }
    }

    #[test]
    fn test_at_threshold_passes() {
        let result = ClassificationResult::model(MoodLabel::new("happy"), 50.0);
        assert_eq!(gate().gate(&result), MoodLabel::new("happy"));
    }

    #[test]
    fn test_fallback_passes_through_unchanged() {
        // Heuristic results carry confidence 0.0 but are never gated
        let result = ClassificationResult::fallback(MoodLabel::new("angry"));
        assert_eq!(gate().gate(&result), MoodLabel::new("angry"));
    }

    #[test]
    fn test_out_of_taxonomy_label_rewritten() {
        let result = ClassificationResult::model(MoodLabel::new("ecstatic"), 99.0);
        assert_eq!(gate().gate(&result), MoodLabel::new("neutral"));
    }

    #[test]
    fn test_configurable_threshold() {
        let gate = ConfidenceGate::new(Arc::new(Taxonomy::basic()), 80.0);
        let result = ClassificationResult::model(MoodLabel::new("happy"), 70.0);
        assert_eq!(gate.gate(&result), MoodLabel::new("neutral"));
    }
}
