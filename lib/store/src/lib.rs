//! Record store for the saffron platform.
//!
//! This crate provides:
//!
//! - **Entities**: recipes, recipe fields, and user profiles
//! - **RecordStore**: the async contract the dialogue flows consume
//! - **MemoryStore**: the in-memory reference implementation

pub mod entity;
pub mod error;
pub mod memory;
pub mod record;

pub use entity::{Profile, Recipe, RecipeFields};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use record::RecordStore;
