//! Gemini API classifier adapter
//!
//! One unified client behind the core's `ClassifierAdapter` seam. The
//! response mode (structured JSON vs single word) and the face-crop
//! preprocessing step are configuration, not separate code paths. All
//! failures are opaque to the pipeline; each failed vote is absorbed by
//! the fallback heuristics.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use moodmix_core::{ClassifierAdapter, ClassifierError, ClassifyInput, Taxonomy};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const USER_AGENT: &str = "MoodMix/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Minimum interval between requests; sequential votes otherwise burst
const RATE_LIMIT_MS: u64 = 250;
/// Edge length of the square the face-crop preprocessing downscales to
const FACE_CROP_EDGE: u32 = 512;
const JPEG_QUALITY: u8 = 85;

/// Expected reply shape, selecting the prompt and what the parser will see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Flat JSON object {"emotion": ..., "confidence": ...}
    #[default]
    StructuredJson,
    /// Unconstrained prose, ideally a single word; handled by the parser's
    /// keyword fallback
    SingleWord,
}

impl ResponseMode {
    /// Parse a config string ("structured" | "single-word"); anything else
    /// is the structured default.
    pub fn from_config(raw: Option<&str>) -> Self {
        match raw {
            Some("single-word") | Some("single_word") => Self::SingleWord,
            _ => Self::StructuredJson,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Unset key means the adapter reports NotConfigured on every call
    pub api_key: Option<String>,
    pub model: String,
    pub response_mode: ResponseMode,
    /// Center-crop + downscale images before upload
    pub face_crop: bool,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            response_mode: ResponseMode::default(),
            face_crop: false,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn from_server_config(config: &crate::config::ServerConfig, api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            response_mode: ResponseMode::from_config(config.response_mode.as_deref()),
            face_crop: config.face_crop.unwrap_or(false),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }
}

/// Rate limiter enforcing a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Gemini rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

// Wire types for the generateContent REST call

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini classifier adapter
pub struct GeminiClient {
    http_client: reqwest::Client,
    config: GeminiConfig,
    taxonomy: Arc<Taxonomy>,
    rate_limiter: RateLimiter,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, taxonomy: Arc<Taxonomy>) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
            taxonomy,
            rate_limiter: RateLimiter::new(RATE_LIMIT_MS),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Comma-joined label list for prose, pipe-joined for the JSON format
    /// hint
    fn label_list(&self, separator: &str) -> String {
        self.taxonomy
            .labels()
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn image_prompt(&self) -> String {
        match self.config.response_mode {
            ResponseMode::StructuredJson => format!(
                "You are an emotion detector. Look only at the person's facial expression \
                 and classify it as exactly one of: {}.\n\
                 Respond using this exact JSON format:\n\
                 {{\"emotion\": \"{}\", \"confidence\": 0-100}}\n\
                 Do not add any extra text outside the JSON.",
                self.label_list(", "),
                self.label_list("|"),
            ),
            ResponseMode::SingleWord => format!(
                "Analyze the facial expression in the image and respond with EXACTLY one word: \
                 {}. Respond only with the word.",
                self.label_list(", "),
            ),
        }
    }

    fn text_prompt(&self, text: &str) -> String {
        match self.config.response_mode {
            ResponseMode::StructuredJson => format!(
                "You are an emotion detector for text. Read the following description of how \
                 a person feels and classify their overall emotion as exactly one of: {}.\n\n\
                 Text: \"{}\"\n\n\
                 Respond using this exact JSON format:\n\
                 {{\"emotion\": \"{}\", \"confidence\": 0-100}}\n\
                 Do not add anything else outside the JSON.",
                self.label_list(", "),
                text,
                self.label_list("|"),
            ),
            ResponseMode::SingleWord => format!(
                "Classify the emotion of this text as one word ({}). Text: {}",
                self.label_list(", "),
                text,
            ),
        }
    }

    fn build_request(&self, input: ClassifyInput<'_>) -> GenerateContentRequest {
        let parts = match input {
            ClassifyInput::Text(text) => vec![RequestPart {
                text: Some(self.text_prompt(text)),
                inline_data: None,
            }],
            ClassifyInput::Image(bytes) => {
                let (payload, mime_type) = self.preprocess_image(bytes);
                vec![
                    RequestPart {
                        text: Some(self.image_prompt()),
                        inline_data: None,
                    },
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type,
                            data: base64::engine::general_purpose::STANDARD.encode(payload),
                        }),
                    },
                ]
            }
        };
        GenerateContentRequest {
            contents: vec![RequestContent { parts }],
        }
    }

    /// Optional face-crop preprocessing: crop the centered square and
    /// downscale before upload. Bytes that do not decode pass through
    /// untouched; the service will report its own error if they are not an
    /// image at all.
    fn preprocess_image(&self, bytes: &[u8]) -> (Vec<u8>, String) {
        if self.config.face_crop {
            if let Some(cropped) = center_crop(bytes) {
                return (cropped, "image/jpeg".to_string());
            }
            tracing::warn!("face-crop preprocessing skipped: image did not decode");
        }
        (bytes.to_vec(), sniff_mime(bytes).to_string())
    }
}

#[async_trait]
impl ClassifierAdapter for GeminiClient {
    async fn classify(&self, input: ClassifyInput<'_>) -> Result<String, ClassifierError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(ClassifierError::NotConfigured);
        };

        self.rate_limiter.wait().await;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let request = self.build_request(input);

        tracing::debug!(model = %self.config.model, "querying Gemini API");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(status.as_u16(), error_text));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ClassifierError::EmptyResponse)?;

        tracing::debug!(raw = %text, "Gemini reply");
        Ok(text)
    }
}

/// Crop the centered square and downscale to the fixed edge, re-encoded
/// as JPEG. None when the bytes do not decode.
fn center_crop(bytes: &[u8]) -> Option<Vec<u8>> {
    let img = image::load_from_memory(bytes).ok()?;
    let (width, height) = (img.width(), img.height());
    let edge = width.min(height);
    let cropped = img.crop_imm((width - edge) / 2, (height - edge) / 2, edge, edge);
    let resized = cropped.resize(FACE_CROP_EDGE, FACE_CROP_EDGE, FilterType::Triangle);

    let mut out = Vec::new();
    let mut cursor = Cursor::new(&mut out);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    resized.write_with_encoder(encoder).ok()?;
    Some(out)
}

/// Mime type from magic bytes; the upload formats in practice are PNG and
/// JPEG
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else {
        "image/jpeg"
    }
}
