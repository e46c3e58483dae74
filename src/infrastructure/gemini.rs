//! Gemini client for text and image generation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::{
    GenAiError, GeneratedImage, ImageGenerationPort, ImageRequest, StructuredTextRequest,
    TextGenerationPort,
};

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for concept generation
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Default model for artwork and model sheets
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Client for the Gemini `generateContent` API
///
/// Requests carry no timeout; a generation runs until the provider answers.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, text_model: &str, image_model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
        }
    }

    /// Call `models/{model}:generateContent`
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(GeminiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let content: GenerateContentResponse = response.json().await?;
        Ok(content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

impl From<GeminiError> for GenAiError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::HttpError(e) if e.is_decode() => GenAiError::InvalidResponse(e.to_string()),
            other => GenAiError::RequestFailed(other.to_string()),
        }
    }
}

// =============================================================================
// Gemini API types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn from_structured(request: &StructuredTextRequest) -> Self {
        Self {
            contents: vec![Content::user(vec![Part::text(&request.instruction)])],
            system_instruction: request
                .system_instruction
                .as_ref()
                .map(|s| Content::system(vec![Part::text(s)])),
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(request.response_schema.clone()),
            }),
        }
    }

    fn from_image(request: &ImageRequest) -> Self {
        Self {
            contents: vec![Content::user(
                request.prompt_parts.iter().map(Part::text).collect(),
            )],
            system_instruction: None,
            generation_config: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    fn system(parts: Vec<Part>) -> Self {
        Self { role: None, parts }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl AsRef<str>) -> Self {
        Self {
            text: Some(text.as_ref().to_string()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of the first candidate; empty if there is none
    pub fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    /// First inline image of the first candidate with non-empty data
    pub fn first_image(&self) -> Option<GeneratedImage> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
            .map(|d| GeneratedImage {
                mime_type: d.mime_type.clone(),
                data: d.data.clone(),
            })
    }
}

// =============================================================================
// Port implementations
// =============================================================================

#[async_trait]
impl TextGenerationPort for GeminiClient {
    async fn generate_structured(&self, request: StructuredTextRequest) -> Result<String, GenAiError> {
        let body = GenerateContentRequest::from_structured(&request);
        let response = self.generate_content(&self.text_model, &body).await?;
        Ok(response.text())
    }
}

#[async_trait]
impl ImageGenerationPort for GeminiClient {
    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GenAiError> {
        let body = GenerateContentRequest::from_image(&request);
        let response = self.generate_content(&self.image_model, &body).await?;
        response.first_image().ok_or(GenAiError::NoImageData)
    }
}
