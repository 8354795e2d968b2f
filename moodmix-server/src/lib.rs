//! moodmix-server library interface
//!
//! Exposes the router and application state for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};

use moodmix_core::{ResourceMap, VoteAggregator};

use crate::config::ServerConfig;
use crate::services::{GeminiClient, GeminiConfig};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Vote aggregator (immutable pipeline configuration)
    pub aggregator: Arc<VoteAggregator>,
    /// Mood -> playlist map, loaded once
    pub resources: Arc<ResourceMap>,
    /// Gemini classifier adapter
    pub adapter: Arc<GeminiClient>,
    /// Vote count for image requests that do not specify one
    pub default_votes: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        aggregator: VoteAggregator,
        resources: ResourceMap,
        adapter: GeminiClient,
        default_votes: usize,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            resources: Arc::new(resources),
            adapter: Arc::new(adapter),
            default_votes,
            startup_time: Utc::now(),
        }
    }
}

/// Build application state from resolved configuration.
///
/// The API key is taken as already resolved (CLI/ENV/TOML) so the caller
/// decides the priority; None means fallback-heuristics-only operation.
pub fn build_state(config: &ServerConfig, api_key: Option<String>) -> anyhow::Result<AppState> {
    if config.pipeline.default_votes > api::classify::MAX_VOTES {
        anyhow::bail!(
            "pipeline.default_votes {} exceeds the per-request maximum {}",
            config.pipeline.default_votes,
            api::classify::MAX_VOTES
        );
    }
    let taxonomy = Arc::new(config.pipeline.taxonomy()?);
    let resources = config.pipeline.resource_map(&taxonomy)?;
    let aggregator = VoteAggregator::new(taxonomy.clone(), config.pipeline.confidence_threshold);
    let gemini_config = GeminiConfig::from_server_config(config, api_key);
    let adapter = GeminiClient::new(gemini_config, taxonomy)
        .map_err(|e| anyhow::anyhow!("Failed to create Gemini client: {}", e))?;

    Ok(AppState::new(
        aggregator,
        resources,
        adapter,
        config.pipeline.default_votes,
    ))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::classify_routes())
        .merge(api::health_routes())
        .with_state(state)
}
