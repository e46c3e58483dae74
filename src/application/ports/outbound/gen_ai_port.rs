//! Generative AI ports - Interfaces for text and image generation
//!
//! The application depends on these traits, not on the concrete provider
//! client, so the orchestration can be exercised against mocks.

use async_trait::async_trait;

use crate::domain::value_objects::compose_data_uri;

/// Request for schema-constrained JSON output from a text model
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredTextRequest {
    /// Free-form user instruction
    pub instruction: String,
    pub system_instruction: Option<String>,
    /// JSON schema the response must follow
    pub response_schema: serde_json::Value,
    pub temperature: Option<f32>,
}

impl StructuredTextRequest {
    pub fn new(instruction: impl Into<String>, response_schema: serde_json::Value) -> Self {
        Self {
            instruction: instruction.into(),
            system_instruction: None,
            response_schema,
            temperature: None,
        }
    }

    pub fn with_system_instruction(mut self, system_instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(system_instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Request for a single generated image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Text prompt parts, sent in order
    pub prompt_parts: Vec<String>,
}

impl ImageRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt_parts: vec![prompt.into()],
        }
    }
}

/// Inline image data returned by the image model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl GeneratedImage {
    pub fn to_data_uri(&self) -> String {
        compose_data_uri(&self.mime_type, &self.data)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    #[error("Generation request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Response contained no image data")]
    NoImageData,
}

/// Port for text generation with structured (JSON) output
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerationPort: Send + Sync {
    /// Returns the raw JSON text produced by the model
    async fn generate_structured(&self, request: StructuredTextRequest) -> Result<String, GenAiError>;
}

/// Port for image generation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGenerationPort: Send + Sync {
    /// Returns the first inline image of the response, or `NoImageData`
    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, GenAiError>;
}
