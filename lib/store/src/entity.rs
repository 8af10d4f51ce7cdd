//! Persisted domain entities.

use chrono::{DateTime, Utc};
use saffron_core::{ActorId, MediaRef, RecipeId};
use serde::{Deserialize, Serialize};

/// The mutable fields of a recipe.
///
/// This is the shape flows accumulate in their drafts and commit to the
/// store; identity and ownership live on [`Recipe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFields {
    /// The recipe title.
    pub title: String,
    /// Ingredient list, comma separated free text.
    pub ingredients: String,
    /// Cooking time in minutes.
    pub cooking_time_minutes: u32,
    /// Skill level, free text (beginner/intermediate/professional).
    pub skill_level: String,
    /// Approximate calories.
    pub calories: u32,
    /// Cooking instructions.
    pub instructions: String,
    /// Optional photo of the finished dish.
    pub photo: Option<MediaRef>,
    /// Optional voice recording of the instructions.
    pub voice: Option<MediaRef>,
}

/// A persisted recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier.
    pub id: RecipeId,
    /// The actor who submitted the recipe.
    pub owner: ActorId,
    /// The recipe content.
    pub fields: RecipeFields,
    /// When the recipe was first saved.
    pub created_at: DateTime<Utc>,
    /// When the recipe was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Returns true if the lowercased term occurs in the title,
    /// ingredients, or instructions.
    #[must_use]
    pub fn matches(&self, lowercased_term: &str) -> bool {
        self.fields.title.to_lowercase().contains(lowercased_term)
            || self
                .fields
                .ingredients
                .to_lowercase()
                .contains(lowercased_term)
            || self
                .fields
                .instructions
                .to_lowercase()
                .contains(lowercased_term)
    }
}

/// A registered user's profile, as rendered by `/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name reported by the transport at registration.
    pub display_name: String,
    /// The username chosen during registration.
    pub username: String,
    /// When the user registered.
    pub joined_at: DateTime<Utc>,
    /// False once the user has been banned.
    pub active: bool,
}
