//! Rarity tiers and their static generation/presentation profiles

use serde::{Deserialize, Serialize};

/// One of the five fixed rarity categories
///
/// The tier shapes how intense the generation prompts are and how a card is
/// presented. It carries no behaviour of its own beyond its [`RarityProfile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// All tiers, lowest first
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Mythic => "Mythic",
        }
    }

    /// Static description, complexity guide and styling for this tier
    pub fn profile(&self) -> RarityProfile {
        match self {
            Self::Common => RarityProfile {
                rarity: *self,
                description: "Basic, everyday objects or simple creatures. Low detail.",
                complexity: "Simple geometry, clean lines, basic textures, familiar objects with faces.",
                style: RarityStyle {
                    color: "text-neutral-400",
                    border: "border-neutral-600",
                    background: "bg-neutral-800",
                },
            },
            Self::Rare => RarityProfile {
                rarity: *self,
                description: "Uncommon, slight mutations or accessories.",
                complexity: "Moderate detail, unique accessories, vibrant colors, expressive features.",
                style: RarityStyle {
                    color: "text-blue-400",
                    border: "border-blue-500",
                    background: "bg-blue-900/50",
                },
            },
            Self::Epic => RarityProfile {
                rarity: *self,
                description: "Impressive, glowing parts, complex lore.",
                complexity: "High detail, glowing elements, particle effects, complex patterned textures.",
                style: RarityStyle {
                    color: "text-purple-400",
                    border: "border-purple-500",
                    background: "bg-purple-900/50",
                },
            },
            Self::Legendary => RarityProfile {
                rarity: *self,
                description: "Unique, powerful, aura effects, extremely detailed.",
                complexity: "Very high complexity, floating parts, golden accents, divine or demonic aura, intricate armor or skin.",
                style: RarityStyle {
                    color: "text-amber-400",
                    border: "border-amber-500",
                    background: "bg-amber-900/50",
                },
            },
            Self::Mythic => RarityProfile {
                rarity: *self,
                description: "Reality-breaking, glitchy, eldritch, abstract.",
                complexity: "Insane complexity, glitch effects, non-euclidean geometry, multiple heads or limbs, cosmic horror elements, hyper-realistic textures.",
                style: RarityStyle {
                    color: "text-rose-500",
                    border: "border-rose-600",
                    background: "bg-rose-900/50",
                },
            },
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Prompt-shaping text and presentation styling for a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RarityProfile {
    pub rarity: Rarity,
    /// What kind of character belongs in this tier
    pub description: &'static str,
    /// Visual complexity guide fed into image prompts
    pub complexity: &'static str,
    pub style: RarityStyle,
}

/// Presentation class names for badges and card borders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RarityStyle {
    pub color: &'static str,
    pub border: &'static str,
    pub background: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tier_has_distinct_profile() {
        let complexities: std::collections::HashSet<_> =
            Rarity::ALL.iter().map(|r| r.profile().complexity).collect();
        assert_eq!(complexities.len(), 5);

        for rarity in Rarity::ALL {
            assert_eq!(rarity.profile().rarity, rarity);
        }
    }

    #[test]
    fn test_rarity_serializes_as_tier_name() {
        let json = serde_json::to_string(&Rarity::Legendary).unwrap();
        assert_eq!(json, "\"Legendary\"");

        let parsed: Rarity = serde_json::from_str("\"Mythic\"").unwrap();
        assert_eq!(parsed, Rarity::Mythic);

        assert!(serde_json::from_str::<Rarity>("\"Uncommon\"").is_err());
    }
}
