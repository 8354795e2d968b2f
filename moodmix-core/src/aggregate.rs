//! Vote aggregation
//!
//! Issues N classification attempts sequentially and resolves them to one
//! stable label. Attempts are deliberately serialized rather than fanned
//! out: each one may block on the external service, and bursts would
//! invite rate limiting.

use std::sync::Arc;

use rand::Rng;

use crate::adapter::{ClassifierAdapter, ClassifyInput};
use crate::gate::ConfidenceGate;
use crate::heuristics::HeuristicEngine;
use crate::parser::ResponseParser;
use crate::taxonomy::{MoodLabel, Taxonomy};
use crate::types::{ClassificationResult, VoteSet};

/// Component issuing N classification attempts and resolving them to one
/// stable label.
///
/// Holds only immutable configuration; each `aggregate` call builds its own
/// vote set, so concurrent invocations share no mutable state.
#[derive(Debug, Clone)]
pub struct VoteAggregator {
    taxonomy: Arc<Taxonomy>,
    parser: ResponseParser,
    gate: ConfidenceGate,
    heuristics: HeuristicEngine,
}

impl VoteAggregator {
    pub fn new(taxonomy: Arc<Taxonomy>, confidence_threshold: f32) -> Self {
        Self {
            parser: ResponseParser::new(taxonomy.clone()),
            gate: ConfidenceGate::new(taxonomy.clone(), confidence_threshold),
            heuristics: HeuristicEngine::new(taxonomy.clone()),
            taxonomy,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Classify with voting: N sequential attempts, majority resolution.
    ///
    /// Each attempt runs the adapter, then parser and gate; an adapter
    /// failure is absorbed by the input-appropriate fallback heuristic for
    /// that single vote, so the vote set always has exactly N entries.
    ///
    /// Empty text input short-circuits to the default label (fail soft);
    /// a service boundary wrapping this may instead reject such input
    /// before calling in.
    ///
    /// `votes` is clamped to at least 1. The RNG backs the image fallback
    /// heuristic and is injected so tests can seed it.
    pub async fn aggregate<R: Rng + Send>(
        &self,
        adapter: &dyn ClassifierAdapter,
        input: ClassifyInput<'_>,
        votes: usize,
        rng: &mut R,
    ) -> MoodLabel {
        if let ClassifyInput::Text(text) = input {
            if text.trim().is_empty() {
                return self.taxonomy.default_label().clone();
            }
        }

        let votes = votes.max(1);
        let mut vote_set: VoteSet = Vec::with_capacity(votes);
        for attempt in 0..votes {
            let result = match adapter.classify(input).await {
                Ok(raw) => self.parser.parse(&raw),
                Err(err) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %err,
                        "classifier attempt failed, using fallback heuristic"
                    );
                    self.fallback_vote(input, rng)
                }
            };
            vote_set.push(result);
        }

        let label = self.resolve(&vote_set);
        tracing::debug!(
            votes = votes,
            mood = %label,
            vote_set = ?vote_set.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            "votes resolved"
        );
        label
    }

    fn fallback_vote<R: Rng>(&self, input: ClassifyInput<'_>, rng: &mut R) -> ClassificationResult {
        let label = match input {
            ClassifyInput::Text(text) => self.heuristics.classify_text(text),
            ClassifyInput::Image(bytes) => self.heuristics.classify_image(bytes, rng),
        };
        ClassificationResult::fallback(label)
    }

    /// Resolve a vote set to one label.
    ///
    /// Absolute majority first: scanning the taxonomy in priority order,
    /// the first label with count >= floor(N/2)+1 (more than half) wins.
    /// Otherwise plurality, with ties again broken by priority order, so
    /// resolution is fully deterministic.
    pub fn resolve(&self, vote_set: &VoteSet) -> MoodLabel {
        let labels: Vec<MoodLabel> = vote_set.iter().map(|r| self.gate.gate(r)).collect();
        if labels.is_empty() {
            return self.taxonomy.default_label().clone();
        }

        let majority = labels.len() / 2 + 1;
        let count_of = |candidate: &MoodLabel| labels.iter().filter(|l| *l == candidate).count();

        for candidate in self.taxonomy.labels() {
            if count_of(candidate) >= majority {
                return candidate.clone();
            }
        }

        let mut best = self.taxonomy.default_label();
        let mut best_count = 0;
        for candidate in self.taxonomy.labels() {
            let count = count_of(candidate);
            if count > best_count {
                best = candidate;
                best_count = count;
            }
        }
        best.clone()
    }
}
