// Service exports
pub mod directory;

pub use directory::{DirectoryCollections, DirectoryError, HttpProfileStore, ProfileStore};
