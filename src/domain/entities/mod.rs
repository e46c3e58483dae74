//! Domain entities - Core business objects with identity

mod concept;
mod entry;

pub use concept::Concept;
pub use entry::{Entry, EntryPatch};
