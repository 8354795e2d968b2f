//! Classification API handlers
//!
//! POST /analyze-text and POST /analyze-image. The boundary fails loud on
//! empty input (400), in contrast to the core library which fails soft to
//! the default label; the two disciplines are deliberate and must not be
//! conflated.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use moodmix_core::ClassifyInput;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Upper bound on per-request votes; each vote is one sequential,
/// rate-limited classifier call
pub const MAX_VOTES: usize = 10;

/// Reject vote counts outside 1..=MAX_VOTES at the boundary
fn validate_votes(votes: usize) -> ApiResult<usize> {
    if votes == 0 || votes > MAX_VOTES {
        return Err(ApiError::BadRequest(format!(
            "votes must be between 1 and {}, got {}",
            MAX_VOTES, votes
        )));
    }
    Ok(votes)
}

/// POST /analyze-text request
#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub user_text: String,
    /// Vote count; text classification is single-shot unless asked
    /// otherwise
    #[serde(default)]
    pub votes: Option<usize>,
}

/// Response for both classification endpoints
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub request_id: Uuid,
    pub mood: String,
    pub playlist: String,
}

/// POST /analyze-text
///
/// Empty or whitespace-only text is rejected with 400 EMPTY_TEXT.
pub async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let text = request.user_text.trim();
    if text.is_empty() {
        return Err(ApiError::EmptyText);
    }

    let votes = validate_votes(request.votes.unwrap_or(1))?;
    let request_id = Uuid::new_v4();
    let mut rng = StdRng::from_entropy();

    let mood = state
        .aggregator
        .aggregate(
            state.adapter.as_ref(),
            ClassifyInput::Text(text),
            votes,
            &mut rng,
        )
        .await;
    let playlist = state.resources.resource_for(&mood).to_string();

    tracing::info!(
        request_id = %request_id,
        votes = votes,
        mood = %mood,
        "text classified"
    );

    Ok(Json(AnalyzeResponse {
        request_id,
        mood: mood.to_string(),
        playlist,
    }))
}

/// POST /analyze-image (multipart)
///
/// Requires an `image` field; an optional `votes` field overrides the
/// configured default vote count.
pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let mut image_bytes: Option<Vec<u8>> = None;
    let mut votes: Option<usize> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                image_bytes = Some(bytes.to_vec());
            }
            Some("votes") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                votes = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| ApiError::BadRequest(format!("invalid votes: {}", raw)))?,
                );
            }
            _ => {}
        }
    }

    let bytes = image_bytes.filter(|b| !b.is_empty()).ok_or(ApiError::MissingImage)?;
    let votes = validate_votes(votes.unwrap_or(state.default_votes))?;
    let request_id = Uuid::new_v4();
    let mut rng = StdRng::from_entropy();

    let mood = state
        .aggregator
        .aggregate(
            state.adapter.as_ref(),
            ClassifyInput::Image(&bytes),
            votes,
            &mut rng,
        )
        .await;
    let playlist = state.resources.resource_for(&mood).to_string();

    tracing::info!(
        request_id = %request_id,
        votes = votes,
        image_bytes = bytes.len(),
        mood = %mood,
        "image classified"
    );

    Ok(Json(AnalyzeResponse {
        request_id,
        mood: mood.to_string(),
        playlist,
    }))
}

/// Build classification routes
pub fn classify_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-text", post(analyze_text))
        .route("/analyze-image", post(analyze_image))
}
