//! Generation Service - Orchestrates concept, artwork and model sheet generation
//!
//! A batch asks the text model for concepts, then requests one image per
//! concept concurrently. Image failures are isolated to their own entry; the
//! batch is published to the collection in a single step once every image
//! request has settled.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::application::ports::outbound::{
    ImageGenerationPort, ImageRequest, StructuredTextRequest, TextGenerationPort,
};
use crate::application::services::collection_service::{
    CollectionError, CollectionHandle, EntryView,
};
use crate::application::services::concept_parser::parse_concepts;
use crate::application::services::prompt_builder::{
    build_artwork_prompt, build_concept_system_instruction, build_model_sheet_prompt,
    concept_response_schema, CONCEPTS_PER_BATCH, CONCEPT_INSTRUCTION, CONCEPT_TEMPERATURE,
};
use crate::domain::entities::{Concept, Entry, EntryPatch};
use crate::domain::value_objects::{EntryId, Rarity};

/// Banner shown when a batch fails as a whole
pub const BATCH_FAILURE_MESSAGE: &str =
    "Algo explotó en la fábrica de memes. Intenta de nuevo.";

/// Blocking notice shown when a model sheet could not be generated
pub const MODEL_SHEET_FAILURE_MESSAGE: &str =
    "No se pudo generar la referencia 3D. Intenta de nuevo.";

/// Summary of a published batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Ids of the new entries, in collection order
    pub entry_ids: Vec<EntryId>,
    /// How many entries were recorded without artwork
    pub failed_images: usize,
}

/// A batch running on its own task
///
/// Dropping the handle detaches the task; the batch still settles.
pub type BatchTask = JoinHandle<Result<BatchOutcome, GenerationError>>;

/// Service driving every call to the generative AI provider
#[derive(Clone)]
pub struct GenerationService {
    text: Arc<dyn TextGenerationPort>,
    images: Arc<dyn ImageGenerationPort>,
    collection: CollectionHandle,
}

impl GenerationService {
    pub fn new(
        text: Arc<dyn TextGenerationPort>,
        images: Arc<dyn ImageGenerationPort>,
        collection: CollectionHandle,
    ) -> Self {
        Self {
            text,
            images,
            collection,
        }
    }

    /// Generate a batch of concepts for `rarity`, prepend it to the collection
    /// and wait for it to settle
    ///
    /// On failure the collection keeps its entries, its error is set to
    /// [`BATCH_FAILURE_MESSAGE`] and the loading flag is cleared. The work runs
    /// on a spawned task, so dropping this future does not leave the
    /// collection loading.
    pub async fn run_batch(&self, rarity: Rarity) -> Result<BatchOutcome, GenerationError> {
        self.start_batch(rarity).await?.await?
    }

    /// Claim the loading flag and start a batch in the background
    ///
    /// Returns `BatchInProgress` if another batch holds the flag. Once this
    /// returns `Ok` the batch runs to completion whether or not the handle is
    /// awaited.
    pub async fn start_batch(&self, rarity: Rarity) -> Result<BatchTask, GenerationError> {
        let (claimed_tx, claimed_rx) = oneshot::channel();
        let service = self.clone();

        let task = tokio::spawn(async move {
            if let Err(e) = service.collection.begin_batch().await {
                let _ = claimed_tx.send(Err(e.clone()));
                return Err(e.into());
            }
            let _ = claimed_tx.send(Ok(()));
            service.generate_batch(rarity).await
        });

        match claimed_rx.await {
            Ok(Ok(())) => Ok(task),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(GenerationError::StoreClosed),
        }
    }

    async fn generate_batch(&self, rarity: Rarity) -> Result<BatchOutcome, GenerationError> {
        tracing::info!(%rarity, "Generating batch");

        let concepts = match self.generate_concepts(rarity).await {
            Ok(concepts) => concepts,
            Err(reason) => {
                tracing::error!(%rarity, error = %reason, "Batch generation failed");
                self.collection.fail_batch(BATCH_FAILURE_MESSAGE).await?;
                return Err(GenerationError::BatchFailed {
                    message: BATCH_FAILURE_MESSAGE,
                    reason,
                });
            }
        };

        let (entries, failed_images) = self.illustrate(concepts).await;
        let entry_ids: Vec<EntryId> = entries.iter().map(|e| e.id).collect();

        self.collection.complete_batch(entries).await?;
        tracing::info!(
            %rarity,
            created = entry_ids.len(),
            failed_images,
            "Batch published"
        );

        Ok(BatchOutcome {
            entry_ids,
            failed_images,
        })
    }

    /// Generate a multi-angle reference sheet for one existing entry
    ///
    /// Unknown ids are a no-op and return `EntryNotFound` without contacting
    /// the provider. Re-invocation on an entry that already has a sheet is
    /// not prevented here. The request runs on a spawned task, so the loading
    /// mark is cleared even if this future is dropped.
    pub async fn run_model_sheet(&self, id: EntryId) -> Result<EntryView, GenerationError> {
        let service = self.clone();
        tokio::spawn(async move { service.generate_model_sheet(id).await }).await?
    }

    async fn generate_model_sheet(&self, id: EntryId) -> Result<EntryView, GenerationError> {
        let view = self
            .collection
            .entry(id)
            .await?
            .ok_or(GenerationError::EntryNotFound(id))?;

        self.collection.set_model_loading(id, true).await?;
        tracing::info!(entry_id = %id, name = %view.entry.name, "Generating model sheet");

        let request = ImageRequest::from_prompt(build_model_sheet_prompt(&view.entry));
        let result = self.images.generate_image(request).await;

        match result {
            Ok(image) => {
                let patched = self
                    .collection
                    .patch_entry(id, EntryPatch::model_sheet(image.to_data_uri()))
                    .await?;
                self.collection.set_model_loading(id, false).await?;
                if !patched {
                    tracing::debug!(entry_id = %id, "Entry removed while its model sheet was generating");
                }
            }
            Err(e) => {
                tracing::error!(entry_id = %id, error = %e, "Model sheet generation failed");
                self.collection.set_model_loading(id, false).await?;
                return Err(GenerationError::ModelSheetFailed {
                    message: MODEL_SHEET_FAILURE_MESSAGE,
                    reason: e.to_string(),
                });
            }
        }

        self.collection
            .entry(id)
            .await?
            .ok_or(GenerationError::EntryNotFound(id))
    }

    async fn generate_concepts(&self, rarity: Rarity) -> Result<Vec<Concept>, String> {
        let request = StructuredTextRequest::new(CONCEPT_INSTRUCTION, concept_response_schema())
            .with_system_instruction(build_concept_system_instruction(rarity))
            .with_temperature(CONCEPT_TEMPERATURE);

        let raw = self
            .text
            .generate_structured(request)
            .await
            .map_err(|e| e.to_string())?;

        let mut drafts = parse_concepts(&raw).map_err(|e| e.to_string())?;
        if drafts.len() > CONCEPTS_PER_BATCH {
            tracing::warn!(
                returned = drafts.len(),
                kept = CONCEPTS_PER_BATCH,
                "Model returned extra concepts, truncating"
            );
            drafts.truncate(CONCEPTS_PER_BATCH);
        } else if drafts.len() < CONCEPTS_PER_BATCH {
            tracing::debug!(returned = drafts.len(), "Model returned fewer concepts than requested");
        }

        Ok(drafts
            .into_iter()
            .map(|draft| draft.into_concept(rarity))
            .collect())
    }

    /// Request artwork for every concept concurrently, keeping concept order
    async fn illustrate(&self, concepts: Vec<Concept>) -> (Vec<Entry>, usize) {
        let requests = concepts.into_iter().map(|concept| async move {
            let prompt = build_artwork_prompt(concept.rarity, &concept.visual_prompt);
            match self.images.generate_image(ImageRequest::from_prompt(prompt)).await {
                Ok(image) => (Entry::from_concept(concept, image.to_data_uri()), true),
                Err(e) => {
                    tracing::warn!(
                        name = %concept.name,
                        error = %e,
                        "Image generation failed for one concept, keeping it without artwork"
                    );
                    (Entry::from_concept(concept, String::new()), false)
                }
            }
        });

        let results = join_all(requests).await;
        let failed = results.iter().filter(|(_, ok)| !ok).count();
        (results.into_iter().map(|(entry, _)| entry).collect(), failed)
    }
}

/// Errors that can occur while generating
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("A batch is already being generated")]
    BatchInProgress,
    /// Text generation or concept validation failed; `message` is user-facing
    #[error("{message}")]
    BatchFailed { message: &'static str, reason: String },
    #[error("Entry {0} not found")]
    EntryNotFound(EntryId),
    /// The model sheet request failed; `message` is user-facing
    #[error("{message}")]
    ModelSheetFailed { message: &'static str, reason: String },
    #[error("Collection store is not running")]
    StoreClosed,
    #[error("Generation task did not finish: {0}")]
    TaskAborted(String),
}

impl From<tokio::task::JoinError> for GenerationError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::TaskAborted(e.to_string())
    }
}

impl From<CollectionError> for GenerationError {
    fn from(e: CollectionError) -> Self {
        match e {
            CollectionError::BatchInProgress => Self::BatchInProgress,
            CollectionError::StoreClosed => Self::StoreClosed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{
        GenAiError, GeneratedImage, MockImageGenerationPort, MockTextGenerationPort,
    };
    use mockall::predicate::function;

    const THREE_CONCEPTS: &str = r#"[
        {"name": "Alpha", "lore": "a", "visualPrompt": "alpha visual"},
        {"name": "Beta", "lore": "b", "visualPrompt": "beta visual"},
        {"name": "Gamma", "lore": "c", "visualPrompt": "gamma visual"}
    ]"#;

    fn png(data: &str) -> GeneratedImage {
        GeneratedImage {
            mime_type: "image/png".to_string(),
            data: data.to_string(),
        }
    }

    fn text_returning(raw: &'static str) -> MockTextGenerationPort {
        let mut text = MockTextGenerationPort::new();
        text.expect_generate_structured()
            .returning(move |_| Ok(raw.to_string()));
        text
    }

    /// Images succeed, returning the visual prompt's first word as payload
    fn images_ok() -> MockImageGenerationPort {
        let mut images = MockImageGenerationPort::new();
        images.expect_generate_image().returning(|request| {
            let prompt = &request.prompt_parts[0];
            let word = prompt
                .split("Visuals: ")
                .nth(1)
                .and_then(|rest| rest.split_whitespace().next())
                .unwrap_or("sheet")
                .to_string();
            Ok(png(&word))
        });
        images
    }

    fn service(
        text: MockTextGenerationPort,
        images: MockImageGenerationPort,
    ) -> GenerationService {
        GenerationService::new(Arc::new(text), Arc::new(images), CollectionHandle::spawn())
    }

    #[tokio::test]
    async fn test_batch_prepends_entries_in_concept_order() {
        let service = service(text_returning(THREE_CONCEPTS), images_ok());
        let collection = service.collection.clone();

        let first = service.run_batch(Rarity::Common).await.unwrap();
        assert_eq!(first.entry_ids.len(), 3);

        let second = service.run_batch(Rarity::Epic).await.unwrap();
        assert_eq!(second.failed_images, 0);

        let snapshot = collection.snapshot().await.unwrap();
        assert_eq!(snapshot.entries.len(), 6);
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error, None);

        let names: Vec<_> = snapshot.entries.iter().map(|v| v.entry.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma", "Alpha", "Beta", "Gamma"]);

        for view in &snapshot.entries[..3] {
            assert_eq!(view.entry.rarity, Rarity::Epic);
            assert!(view.entry.image_url.starts_with("data:image/png;base64,"));
            assert_eq!(view.entry.model_sheet_url, None);
        }
        assert_eq!(snapshot.entries[0].entry.id, second.entry_ids[0]);
        assert_eq!(snapshot.entries[3].entry.rarity, Rarity::Common);
    }

    #[tokio::test]
    async fn test_text_request_is_shaped_by_rarity() {
        let mut text = MockTextGenerationPort::new();
        text.expect_generate_structured()
            .with(function(|request: &StructuredTextRequest| {
                request.instruction == CONCEPT_INSTRUCTION
                    && request.temperature == Some(CONCEPT_TEMPERATURE)
                    && request
                        .system_instruction
                        .as_deref()
                        .is_some_and(|s| s.contains("rarity: Legendary"))
            }))
            .times(1)
            .returning(|_| Ok(THREE_CONCEPTS.to_string()));

        let service = service(text, images_ok());
        service.run_batch(Rarity::Legendary).await.unwrap();
    }

    #[tokio::test]
    async fn test_one_failed_image_keeps_entry_without_artwork() {
        let mut images = MockImageGenerationPort::new();
        images.expect_generate_image().returning(|request| {
            if request.prompt_parts[0].contains("beta visual") {
                Err(GenAiError::NoImageData)
            } else {
                Ok(png("ok"))
            }
        });

        let service = service(text_returning(THREE_CONCEPTS), images);
        let outcome = service.run_batch(Rarity::Rare).await.unwrap();
        assert_eq!(outcome.failed_images, 1);

        let snapshot = service.collection.snapshot().await.unwrap();
        assert_eq!(snapshot.entries.len(), 3);
        assert_eq!(snapshot.entries[0].entry.image_url, "data:image/png;base64,ok");
        assert_eq!(snapshot.entries[1].entry.name, "Beta");
        assert_eq!(snapshot.entries[1].entry.image_url, "");
        assert_eq!(snapshot.entries[2].entry.image_url, "data:image/png;base64,ok");
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test]
    async fn test_unparsable_concepts_fail_batch_without_touching_entries() {
        let service = service(text_returning(THREE_CONCEPTS), images_ok());
        service.run_batch(Rarity::Common).await.unwrap();

        let mut broken = MockTextGenerationPort::new();
        broken
            .expect_generate_structured()
            .returning(|_| Ok("definitely not json".to_string()));
        let mut images = MockImageGenerationPort::new();
        images.expect_generate_image().never();

        let failing = GenerationService::new(
            Arc::new(broken),
            Arc::new(images),
            service.collection.clone(),
        );

        let err = failing.run_batch(Rarity::Mythic).await.unwrap_err();
        assert!(matches!(err, GenerationError::BatchFailed { .. }));
        assert_eq!(err.to_string(), BATCH_FAILURE_MESSAGE);

        let snapshot = service.collection.snapshot().await.unwrap();
        assert_eq!(snapshot.entries.len(), 3);
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error.as_deref(), Some(BATCH_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_text_request_error_fails_batch() {
        let mut text = MockTextGenerationPort::new();
        text.expect_generate_structured()
            .returning(|_| Err(GenAiError::RequestFailed("401 Unauthorized".to_string())));

        let service = service(text, MockImageGenerationPort::new());
        let err = service.run_batch(Rarity::Common).await.unwrap_err();
        assert!(matches!(err, GenerationError::BatchFailed { .. }));

        let snapshot = service.collection.snapshot().await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.error.as_deref(), Some(BATCH_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_next_batch_clears_previous_error() {
        let collection = CollectionHandle::spawn();
        collection.begin_batch().await.unwrap();
        collection.fail_batch(BATCH_FAILURE_MESSAGE).await.unwrap();

        let service = GenerationService::new(
            Arc::new(text_returning(THREE_CONCEPTS)),
            Arc::new(images_ok()),
            collection.clone(),
        );
        service.run_batch(Rarity::Common).await.unwrap();

        assert_eq!(collection.snapshot().await.unwrap().error, None);
    }

    #[tokio::test]
    async fn test_concept_count_is_capped() {
        let five = r#"[
            {"name": "1", "lore": "a", "visualPrompt": "v1"},
            {"name": "2", "lore": "a", "visualPrompt": "v2"},
            {"name": "3", "lore": "a", "visualPrompt": "v3"},
            {"name": "4", "lore": "a", "visualPrompt": "v4"},
            {"name": "5", "lore": "a", "visualPrompt": "v5"}
        ]"#;
        let one = r#"[{"name": "solo", "lore": "a", "visualPrompt": "v"}]"#;

        let service = service(text_returning(five), images_ok());
        let outcome = service.run_batch(Rarity::Common).await.unwrap();
        assert_eq!(outcome.entry_ids.len(), CONCEPTS_PER_BATCH);

        let service_one = GenerationService::new(
            Arc::new(text_returning(one)),
            Arc::new(images_ok()),
            CollectionHandle::spawn(),
        );
        let outcome = service_one.run_batch(Rarity::Common).await.unwrap();
        assert_eq!(outcome.entry_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_rejected_while_one_is_running() {
        let collection = CollectionHandle::spawn();
        collection.begin_batch().await.unwrap();

        let mut text = MockTextGenerationPort::new();
        text.expect_generate_structured().never();
        let service = GenerationService::new(
            Arc::new(text),
            Arc::new(MockImageGenerationPort::new()),
            collection,
        );

        let err = service.run_batch(Rarity::Common).await.unwrap_err();
        assert!(matches!(err, GenerationError::BatchInProgress));
    }

    #[tokio::test]
    async fn test_model_sheet_patches_only_target_entry() {
        let service = service(text_returning(THREE_CONCEPTS), images_ok());
        let outcome = service.run_batch(Rarity::Epic).await.unwrap();
        let before = service.collection.snapshot().await.unwrap();
        let target = outcome.entry_ids[1];

        let view = service.run_model_sheet(target).await.unwrap();
        assert_eq!(
            view.entry.model_sheet_url.as_deref(),
            Some("data:image/png;base64,sheet")
        );
        assert!(!view.is_model_loading);

        let after = service.collection.snapshot().await.unwrap();
        assert_eq!(after.entries[0], before.entries[0]);
        assert_eq!(after.entries[2], before.entries[2]);
        assert_eq!(after.entries[1].entry.image_url, before.entries[1].entry.image_url);
    }

    #[tokio::test]
    async fn test_model_sheet_failure_keeps_previous_sheet() {
        let collection = CollectionHandle::spawn();
        let batch = GenerationService::new(
            Arc::new(text_returning(THREE_CONCEPTS)),
            Arc::new(images_ok()),
            collection.clone(),
        );
        let outcome = batch.run_batch(Rarity::Epic).await.unwrap();
        let target = outcome.entry_ids[0];
        collection
            .patch_entry(target, EntryPatch::model_sheet("old-sheet"))
            .await
            .unwrap();

        let mut images = MockImageGenerationPort::new();
        images
            .expect_generate_image()
            .times(1)
            .returning(|_| Err(GenAiError::NoImageData));
        let failing = GenerationService::new(
            Arc::new(MockTextGenerationPort::new()),
            Arc::new(images),
            collection.clone(),
        );

        let err = failing.run_model_sheet(target).await.unwrap_err();
        assert!(matches!(err, GenerationError::ModelSheetFailed { .. }));
        assert_eq!(err.to_string(), MODEL_SHEET_FAILURE_MESSAGE);

        let view = collection.entry(target).await.unwrap().unwrap();
        assert_eq!(view.entry.model_sheet_url.as_deref(), Some("old-sheet"));
        assert!(!view.is_model_loading);

        // Batch banner is untouched by a model sheet failure
        assert_eq!(collection.snapshot().await.unwrap().error, None);
    }

    #[tokio::test]
    async fn test_model_sheet_for_unknown_entry_is_noop() {
        let mut images = MockImageGenerationPort::new();
        images.expect_generate_image().never();
        let service = service(text_returning(THREE_CONCEPTS), images);

        let err = service.run_model_sheet(EntryId::new()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EntryNotFound(_)));
        assert!(service.collection.snapshot().await.unwrap().entries.is_empty());
    }
}
