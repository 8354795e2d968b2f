//! Fallback heuristics
//!
//! Substitute classifiers used when the external model is unavailable or
//! errors. The text heuristic is a deterministic keyword scan; the image
//! heuristic buckets mean luminance into brightness ranges and draws from
//! the bucket's candidate set via an injected random source. Both always
//! return a taxonomy member and never fail.

use std::sync::Arc;

use image::imageops::FilterType;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::taxonomy::{MoodLabel, Taxonomy};

/// Downsample grid for the luminance estimate (10x10 = 100 samples)
const LUMA_GRID: u32 = 10;
/// Mean luminance above this is the bright bucket
const BRIGHT_MIN: f32 = 140.0;
/// Mean luminance above this (and not bright) is the medium bucket
const MEDIUM_MIN: f32 = 100.0;

/// Candidate labels per brightness bucket, filtered to the taxonomy at
/// lookup time
const BRIGHT_CANDIDATES: [&str; 2] = ["happy", "neutral"];
const MEDIUM_CANDIDATES: [&str; 3] = ["neutral", "happy", "sad"];
const DARK_CANDIDATES: [&str; 3] = ["sad", "angry", "neutral"];

#[derive(Debug, Clone)]
pub struct HeuristicEngine {
    taxonomy: Arc<Taxonomy>,
}

impl HeuristicEngine {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Deterministic keyword heuristic for text.
    ///
    /// Scans labels in taxonomy priority order, testing the label name and
    /// its synonym set against the lower-cased text; first match wins, no
    /// match is the default label. No randomness.
    pub fn classify_text(&self, text: &str) -> MoodLabel {
        let lowered = text.to_lowercase();
        for label in self.taxonomy.labels() {
            if self.taxonomy.mentions(&lowered, label) {
                return label.clone();
            }
        }
        self.taxonomy.default_label().clone()
    }

    /// Brightness-bucket heuristic for images.
    ///
    /// Mean luminance over a 10x10 downsample selects a candidate set
    /// (>140 bright, >100 medium, else dark); the result is drawn from that
    /// set via the injected RNG. An unreadable image degrades to a uniform
    /// draw over the full taxonomy. The one intentionally nondeterministic
    /// element in the pipeline.
    pub fn classify_image<R: Rng>(&self, bytes: &[u8], rng: &mut R) -> MoodLabel {
        let Some(mean) = mean_luminance(bytes) else {
            tracing::debug!("unreadable image, drawing uniformly from taxonomy");
            return self.choose_from(&[], rng);
        };

        let candidates: &[&str] = if mean > BRIGHT_MIN {
            &BRIGHT_CANDIDATES
        } else if mean > MEDIUM_MIN {
            &MEDIUM_CANDIDATES
        } else {
            &DARK_CANDIDATES
        };
        tracing::debug!(mean_luminance = mean, candidates = ?candidates, "brightness bucket");
        self.choose_from(candidates, rng)
    }

    /// Uniform draw from the candidate names present in the taxonomy; an
    /// empty filtered set degrades to the full taxonomy.
    fn choose_from<R: Rng>(&self, candidates: &[&str], rng: &mut R) -> MoodLabel {
        let members: Vec<&MoodLabel> = candidates
            .iter()
            .map(|name| MoodLabel::new(name))
            .filter_map(|label| {
                self.taxonomy
                    .labels()
                    .iter()
                    .find(|member| **member == label)
            })
            .collect();

        if let Some(label) = members.choose(rng) {
            (*label).clone()
        } else {
            self.taxonomy
                .labels()
                .choose(rng)
                .expect("taxonomy is never empty")
                .clone()
        }
    }
}

/// Mean luminance of the image downsampled to the fixed grid, or None when
/// the bytes do not decode as an image.
fn mean_luminance(bytes: &[u8]) -> Option<f32> {
    let decoded = image::load_from_memory(bytes).ok()?;
    let luma = image::imageops::resize(
        &decoded.to_luma8(),
        LUMA_GRID,
        LUMA_GRID,
        FilterType::Triangle,
    );
    let sum: u32 = luma.pixels().map(|p| u32::from(p.0[0])).sum();
    Some(sum as f32 / (LUMA_GRID * LUMA_GRID) as f32)
}
