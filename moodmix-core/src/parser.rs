//! Classifier response parsing
//!
//! Turns one raw classifier response (structured JSON or unconstrained
//! prose) into a `ClassificationResult`. Never fails: a response carrying
//! no usable signal parses to the default label.

use std::sync::Arc;

use serde::Deserialize;

use crate::taxonomy::{MoodLabel, Taxonomy};
use crate::types::ClassificationResult;

/// Expected shape of a structured classifier reply
#[derive(Debug, Deserialize)]
struct StructuredReply {
    emotion: String,
    #[serde(default)]
    confidence: f32,
}

/// Parser for raw classifier responses.
///
/// The keyword fallback scans labels in a fixed, documented order so that
/// prose mentioning several moods resolves deterministically. For the basic
/// taxonomy the scan order is happy, angry, sad; labels the built-in order
/// does not mention follow in taxonomy priority order. Synonyms apply
/// ("mad" matches angry).
#[derive(Debug, Clone)]
pub struct ResponseParser {
    taxonomy: Arc<Taxonomy>,
    scan_order: Vec<MoodLabel>,
}

/// Keyword-scan precedence for labels the original rules covered
const SCAN_PRECEDENCE: [&str; 3] = ["happy", "angry", "sad"];

impl ResponseParser {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        let scan_order = default_scan_order(&taxonomy);
        Self {
            taxonomy,
            scan_order,
        }
    }

    /// Override the keyword-scan order (members only; non-members are
    /// dropped).
    pub fn with_scan_order(mut self, order: &[&str]) -> Self {
        self.scan_order = order
            .iter()
            .map(|l| MoodLabel::new(l))
            .filter(|l| self.taxonomy.contains(l))
            .collect();
        self
    }

    /// Parse one raw classifier response. Never fails.
    ///
    /// Strict JSON decode first; on success the emotion is canonicalized
    /// (out-of-taxonomy values become the default, confidence preserved for
    /// the gate to judge). On decode failure, a case-insensitive keyword
    /// scan over the raw text; keyword hits carry `Source::Fallback` so the
    /// gate passes them through ungated.
    pub fn parse(&self, raw: &str) -> ClassificationResult {
        let stripped = strip_code_fence(raw);

        if let Ok(reply) = serde_json::from_str::<StructuredReply>(stripped) {
            let label = self.taxonomy.canonicalize(&reply.emotion);
            tracing::debug!(
                emotion = %reply.emotion,
                confidence = reply.confidence,
                label = %label,
                "structured classifier reply"
            );
            return ClassificationResult::model(label, reply.confidence);
        }

        let lowered = raw.to_lowercase();
        for label in &self.scan_order {
            if self.taxonomy.mentions(&lowered, label) {
                tracing::debug!(label = %label, "keyword match in unstructured reply");
                return ClassificationResult::fallback(label.clone());
            }
        }

        ClassificationResult::fallback(self.taxonomy.default_label().clone())
    }
}

/// Scan order: the documented precedence first, then any remaining
/// non-default labels in taxonomy priority order.
fn default_scan_order(taxonomy: &Taxonomy) -> Vec<MoodLabel> {
    let mut order: Vec<MoodLabel> = SCAN_PRECEDENCE
        .iter()
        .map(|l| MoodLabel::new(l))
        .filter(|l| taxonomy.contains(l))
        .collect();
    for label in taxonomy.labels() {
        if label != taxonomy.default_label() && !order.contains(label) {
            order.push(label.clone());
        }
    }
    order
}

/// Models often wrap JSON replies in Markdown code fences; strip them
/// before the strict decode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
