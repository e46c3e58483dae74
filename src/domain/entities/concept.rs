//! Concept - a text-only character description produced by the text model

use crate::domain::value_objects::Rarity;

/// A generated meme character before any image exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    pub name: String,
    /// Short, absurd description shown on the card
    pub lore: String,
    /// English description used to prompt the image model
    pub visual_prompt: String,
    pub rarity: Rarity,
}

impl Concept {
    pub fn new(
        name: impl Into<String>,
        lore: impl Into<String>,
        visual_prompt: impl Into<String>,
        rarity: Rarity,
    ) -> Self {
        Self {
            name: name.into(),
            lore: lore.into(),
            visual_prompt: visual_prompt.into(),
            rarity,
        }
    }
}
