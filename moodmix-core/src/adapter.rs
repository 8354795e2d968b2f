//! Classifier adapter seam
//!
//! The external classification service sits behind this trait so that the
//! vote aggregator can be driven by a real model client or a test
//! substitute. The adapter returns the raw response text; parsing and
//! gating happen downstream. Transport concerns (timeouts, rate limiting)
//! belong to the adapter implementation, not to the pipeline.

use async_trait::async_trait;
use thiserror::Error;

/// Errors an adapter may surface. All of them are opaque failures to the
/// pipeline: the failed vote is absorbed by the fallback heuristics.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// No API key or endpoint was configured
    #[error("classifier not configured")]
    NotConfigured,

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the service
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// The service replied but carried no usable text
    #[error("empty response from classifier")]
    EmptyResponse,
}

/// Input handed to one classification attempt
#[derive(Debug, Clone, Copy)]
pub enum ClassifyInput<'a> {
    Text(&'a str),
    Image(&'a [u8]),
}

/// Boundary wrapping the actual AI classification call.
#[async_trait]
pub trait ClassifierAdapter: Send + Sync {
    /// One classification attempt; returns the raw response text.
    async fn classify(&self, input: ClassifyInput<'_>) -> Result<String, ClassifierError>;
}
