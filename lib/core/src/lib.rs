//! Core domain types and utilities for the saffron recipe assistant.
//!
//! This crate provides the foundational types, error handling, and shared
//! utilities used throughout the saffron conversational recipe assistant.

pub mod error;
pub mod id;
pub mod media;

pub use error::Result;
pub use id::{ActorId, ChatId, RecipeId};
pub use media::{MediaKind, MediaRef};
