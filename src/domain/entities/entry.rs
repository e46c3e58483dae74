//! Entry entity - a concept plus its generated images, as stored in the collection

use chrono::Utc;

use crate::domain::entities::Concept;
use crate::domain::value_objects::{EntryId, Rarity};

/// A gallery card
///
/// Identity is `id`. The concept fields never change after creation; only the
/// image fields are patched (see [`EntryPatch`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub lore: String,
    pub visual_prompt: String,
    pub rarity: Rarity,
    /// Artwork as a data URI. Empty when image generation failed.
    pub image_url: String,
    /// Multi-angle reference sheet, generated on demand
    pub model_sheet_url: Option<String>,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Entry {
    /// Create an entry from a concept with a fresh id and the current time
    pub fn from_concept(concept: Concept, image_url: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(),
            name: concept.name,
            lore: concept.lore,
            visual_prompt: concept.visual_prompt,
            rarity: concept.rarity,
            image_url: image_url.into(),
            model_sheet_url: None,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn has_model_sheet(&self) -> bool {
        self.model_sheet_url.is_some()
    }

    /// Shallow-merge the fields present in `patch`, leaving the rest untouched
    pub fn apply(&mut self, patch: EntryPatch) {
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(model_sheet_url) = patch.model_sheet_url {
            self.model_sheet_url = Some(model_sheet_url);
        }
    }
}

/// Partial update for an [`Entry`]; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub image_url: Option<String>,
    pub model_sheet_url: Option<String>,
}

impl EntryPatch {
    pub fn model_sheet(url: impl Into<String>) -> Self {
        Self {
            model_sheet_url: Some(url.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> Entry {
        Entry::from_concept(
            Concept::new(
                "Tralalero Tralala",
                "Un tiburón con Nikes, bro.",
                "a shark wearing blue sneakers",
                Rarity::Epic,
            ),
            "data:image/png;base64,AAAA",
        )
    }

    #[test]
    fn test_from_concept_copies_fields() {
        let entry = sample_entry();
        assert_eq!(entry.name, "Tralalero Tralala");
        assert_eq!(entry.rarity, Rarity::Epic);
        assert_eq!(entry.image_url, "data:image/png;base64,AAAA");
        assert!(!entry.has_model_sheet());
        assert!(entry.timestamp > 0);
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut entry = sample_entry();
        let before = entry.clone();

        entry.apply(EntryPatch::model_sheet("data:image/png;base64,BBBB"));

        assert_eq!(
            entry.model_sheet_url.as_deref(),
            Some("data:image/png;base64,BBBB")
        );
        assert_eq!(entry.image_url, before.image_url);
        assert_eq!(entry.name, before.name);
        assert_eq!(entry.id, before.id);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut entry = sample_entry();
        let before = entry.clone();
        entry.apply(EntryPatch::default());
        assert_eq!(entry, before);
    }
}
