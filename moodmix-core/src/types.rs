//! Classification result types

use serde::{Deserialize, Serialize};

use crate::taxonomy::MoodLabel;

/// Where a classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Parsed from a structured model response; confidence is meaningful
    Model,
    /// Produced by a heuristic (keyword scan or brightness bucket);
    /// confidence carries no signal and is fixed at 0.0
    Fallback,
}

/// One classification attempt, before gating.
///
/// Invariant: `label` is always a member of the configured taxonomy (the
/// parser and heuristics canonicalize before constructing one of these).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: MoodLabel,
    /// Confidence in [0, 100]; only meaningful when `source == Model`
    pub confidence: f32,
    pub source: Source,
}

impl ClassificationResult {
    pub fn model(label: MoodLabel, confidence: f32) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 100.0),
            source: Source::Model,
        }
    }

    pub fn fallback(label: MoodLabel) -> Self {
        Self {
            label,
            confidence: 0.0,
            source: Source::Fallback,
        }
    }
}

/// Ordered sequence of classification attempts, length exactly N.
///
/// A failed adapter call still contributes one entry (produced by the
/// fallback heuristics), so the length invariant always holds.
pub type VoteSet = Vec<ClassificationResult>;
