//! Google Cloud Vision document-text-detection adapter.
//!
//! One blocking `images:annotate` request per receipt. The adapter owns the
//! token contract consumed downstream: per-word annotations only (the API's
//! first annotation is a whole-image summary and is discarded), each token
//! positioned at the minimum y of its bounding polygon.
//!
//! No retries here — a deadline, if any, is the caller's concern.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::types::{TextDetector, Token};
use super::ExtractionError;

const VISION_ENDPOINT: &str = "https://vision.googleapis.com";

/// Default language hints: Japanese receipts with Latin fallback.
pub const DEFAULT_LANGUAGE_HINTS: [&str; 2] = ["ja", "en"];

/// Blocking Cloud Vision client with API-key auth.
pub struct GoogleVisionDetector {
    base_url: String,
    api_key: String,
    language_hints: Vec<String>,
    client: reqwest::blocking::Client,
}

impl GoogleVisionDetector {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(VISION_ENDPOINT, api_key)
    }

    /// Point at a non-default endpoint (emulator, proxy).
    pub fn with_base_url(base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            language_hints: DEFAULT_LANGUAGE_HINTS.iter().map(|s| s.to_string()).collect(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Override the language hints sent with each request.
    pub fn with_language_hints(mut self, hints: &[&str]) -> Self {
        self.language_hints = hints.iter().map(|s| s.to_string()).collect();
        self
    }
}

// ── Wire types (camelCase per the Vision REST API) ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest<'a> {
    requests: Vec<AnnotateRequestEntry<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequestEntry<'a> {
    image: ImageContent,
    features: Vec<Feature<'a>>,
    image_context: ImageContext<'a>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    feature_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext<'a> {
    language_hints: &'a [String],
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResponseEntry>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponseEntry {
    error: Option<ApiError>,
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    bounding_poly: BoundingPoly,
}

#[derive(Deserialize, Default)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

// The API omits zero-valued coordinates, hence the defaults.
#[derive(Deserialize, Default)]
struct Vertex {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
}

impl TextDetector for GoogleVisionDetector {
    fn detect(&self, image_bytes: &[u8]) -> Result<Vec<Token>, ExtractionError> {
        let start = std::time::Instant::now();

        let content = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let body = AnnotateRequest {
            requests: vec![AnnotateRequestEntry {
                image: ImageContent { content },
                features: vec![Feature {
                    feature_type: "DOCUMENT_TEXT_DETECTION",
                }],
                image_context: ImageContext {
                    language_hints: &self.language_hints,
                },
            }],
        };

        let url = format!("{}/v1/images:annotate?key={}", self.base_url, self.api_key);
        let response: AnnotateResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let entry = response.responses.into_iter().next().unwrap_or_default();
        let tokens = tokens_from_response(entry)?;

        info!(
            elapsed_ms = %start.elapsed().as_millis(),
            tokens = tokens.len(),
            "Document text detection complete"
        );
        Ok(tokens)
    }
}

/// Convert one annotate response into word tokens.
///
/// A reported service error is terminal. No annotations means a blank or
/// unreadable receipt — an empty token list, not an error. The first
/// annotation spans the whole image and is skipped.
fn tokens_from_response(entry: AnnotateResponseEntry) -> Result<Vec<Token>, ExtractionError> {
    if let Some(error) = entry.error {
        if !error.message.is_empty() {
            return Err(ExtractionError::Recognition(error.message));
        }
    }

    Ok(entry
        .text_annotations
        .into_iter()
        .skip(1)
        .map(|a| {
            let y = a
                .bounding_poly
                .vertices
                .iter()
                .map(|v| v.y)
                .min()
                .unwrap_or(0);
            Token {
                text: a.description,
                y: y as f32,
            }
        })
        .collect())
}
