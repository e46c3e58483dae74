//! Domain layer - Core types with no knowledge of HTTP or the AI provider
//!
//! This layer contains:
//! - Entities: Concept, Entry
//! - Value Objects: EntryId, Rarity tiers, inline image payloads

pub mod entities;
pub mod value_objects;
