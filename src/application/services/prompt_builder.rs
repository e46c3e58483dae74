//! Prompt building functions for concept, artwork and model sheet requests

use serde_json::json;

use crate::domain::entities::Entry;
use crate::domain::value_objects::Rarity;

/// Number of concepts requested per batch
pub const CONCEPTS_PER_BATCH: usize = 3;

/// High sampling temperature to favour novel, absurd output
pub const CONCEPT_TEMPERATURE: f32 = 1.4;

/// User instruction sent alongside the system instruction
pub const CONCEPT_INSTRUCTION: &str = "Generate 3 concepts.";

/// Build the system instruction that frames a batch for the given tier
pub fn build_concept_system_instruction(rarity: Rarity) -> String {
    let profile = rarity.profile();
    let mut prompt = String::new();

    prompt.push_str(
        "You are a creative engine for \"Brainrot\" memes (viral, absurd, gen z humor).\n",
    );
    prompt.push_str(&format!(
        "User wants {} NEW concepts with rarity: {}.\n\n",
        CONCEPTS_PER_BATCH, rarity
    ));
    prompt.push_str(&format!("Rarity definition: {}\n", profile.description));
    prompt.push_str(&format!("Visual Complexity Guide: {}\n\n", profile.complexity));
    prompt.push_str("Generate names and lore in Spanish/Spanglish. Visual prompts in English.");

    prompt
}

/// Response schema: an array of objects with `name`, `lore` and `visualPrompt`
pub fn concept_response_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": {
                    "type": "STRING",
                    "description": "The name of the brainrot character/meme. Catchy, absurd, original."
                },
                "lore": {
                    "type": "STRING",
                    "description": "Short, funny, nonsensical description. Use Gen Z slang (Spanish/Spanglish)."
                },
                "visualPrompt": {
                    "type": "STRING",
                    "description": "Detailed visual description for image generation (English)."
                }
            },
            "required": ["name", "lore", "visualPrompt"]
        }
    })
}

/// Prompt for a concept's main artwork
pub fn build_artwork_prompt(rarity: Rarity, visual_prompt: &str) -> String {
    format!(
        "Rarity: {}. A high quality, 3d render, surreal meme art style. Visuals: {}. Complexity level: {}",
        rarity,
        visual_prompt,
        rarity.profile().complexity
    )
}

/// Prompt for a front/side/back reference sheet of an existing entry
pub fn build_model_sheet_prompt(entry: &Entry) -> String {
    let mut prompt = String::from(
        "Create a professional 3D character reference sheet (T-Pose) for a video game asset. \
         Include Front View, Side View, and Back View. ",
    );
    prompt.push_str(&format!("Character: {}. ", entry.name));
    prompt.push_str(&format!("Description: {}. ", entry.visual_prompt));
    prompt.push_str(
        "Style: Fortnite UEFN art style, high fidelity, neutral background, \
         flat lighting for modeling reference, orthographic projection. ",
    );
    prompt.push_str(&format!("Complexity: {}", entry.rarity.profile().complexity));
    prompt
}
