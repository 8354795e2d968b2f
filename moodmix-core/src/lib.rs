//! # MoodMix Core Library
//!
//! Stabilization pipeline for noisy emotion classifications:
//! - Label taxonomy (configured, closed set with a default label)
//! - Response parsing with keyword fallback
//! - Confidence gating
//! - Fallback heuristics (deterministic text, randomized-within-bounds image)
//! - Multi-sample majority voting with deterministic tie-break
//! - Label -> playlist resource mapping

pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod gate;
pub mod heuristics;
pub mod parser;
pub mod resources;
pub mod taxonomy;
pub mod types;

pub use adapter::{ClassifierAdapter, ClassifierError, ClassifyInput};
pub use aggregate::VoteAggregator;
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use gate::ConfidenceGate;
pub use heuristics::HeuristicEngine;
pub use parser::ResponseParser;
pub use resources::ResourceMap;
pub use taxonomy::{MoodLabel, Taxonomy};
pub use types::{ClassificationResult, Source, VoteSet};
