//! Strict validation of the text model's concept output

use serde::Deserialize;

use crate::domain::entities::Concept;
use crate::domain::value_objects::Rarity;

/// One concept as returned by the text model, before a tier is attached
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptDraft {
    pub name: String,
    pub lore: String,
    pub visual_prompt: String,
}

impl ConceptDraft {
    pub fn into_concept(self, rarity: Rarity) -> Concept {
        Concept::new(self.name, self.lore, self.visual_prompt, rarity)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConceptParseError {
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("response does not match the concept schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("model returned no concepts")]
    NoConcepts,
}

/// Parse the raw JSON text into concept drafts
///
/// Every field of every concept must be present as a string; the array must
/// contain at least one concept. Empty strings are kept as returned.
/// Surrounding whitespace of the response is trimmed.
pub fn parse_concepts(raw: &str) -> Result<Vec<ConceptDraft>, ConceptParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConceptParseError::EmptyResponse);
    }

    let drafts: Vec<ConceptDraft> = serde_json::from_str(raw)?;
    if drafts.is_empty() {
        return Err(ConceptParseError::NoConcepts);
    }

    Ok(drafts)
}
