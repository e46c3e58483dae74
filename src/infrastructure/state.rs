//! Shared application state

use std::sync::Arc;

use crate::application::ports::outbound::{ImageGenerationPort, TextGenerationPort};
use crate::application::services::{CollectionHandle, GenerationService};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::gemini::GeminiClient;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    /// Session-only gallery
    pub collection: CollectionHandle,
    pub generation_service: Arc<GenerationService>,
}

impl AppState {
    /// Wire the Gemini client and spawn the collection actor
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: AppConfig) -> Self {
        let gemini = Arc::new(GeminiClient::new(
            &config.gemini_base_url,
            &config.gemini_api_key,
            &config.text_model,
            &config.image_model,
        ));

        Self::with_ports(config, gemini.clone(), gemini)
    }

    /// Build the state around arbitrary generation backends
    pub fn with_ports(
        config: AppConfig,
        text: Arc<dyn TextGenerationPort>,
        images: Arc<dyn ImageGenerationPort>,
    ) -> Self {
        let collection = CollectionHandle::spawn();
        let generation_service = Arc::new(GenerationService::new(text, images, collection.clone()));

        Self {
            config,
            collection,
            generation_service,
        }
    }
}
