//! Value objects - Immutable objects defined by their attributes

mod ids;
mod image_data;
mod rarity;

pub use ids::EntryId;
pub use image_data::{compose_data_uri, download_file_name, DecodedImage};
pub use rarity::{Rarity, RarityProfile};
