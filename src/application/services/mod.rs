//! Application services - Use case implementations
//!
//! This module contains the generation orchestrator, the collection actor and
//! the prompt/parse helpers they share.

pub mod collection_service;
pub mod concept_parser;
pub mod generation_service;
pub mod prompt_builder;

pub use collection_service::{CollectionHandle, CollectionSnapshot, EntryView};
pub use generation_service::{
    GenerationError, GenerationService, BATCH_FAILURE_MESSAGE, MODEL_SHEET_FAILURE_MESSAGE,
};
