//! The record-store contract consumed by the dialogue flows.

use crate::entity::{Profile, Recipe, RecipeFields};
use crate::error::StoreError;
use async_trait::async_trait;
use saffron_core::{ActorId, RecipeId};

/// Persistence contract for users, recipes, and health metrics.
///
/// Query methods that return sequences order them newest first.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns true if the actor is registered and not banned.
    async fn is_registered(&self, actor: ActorId) -> Result<bool, StoreError>;

    /// Registers an actor. Registering an already-registered actor is a
    /// no-op and keeps the existing record.
    async fn register(
        &self,
        actor: ActorId,
        display_name: &str,
        username: &str,
    ) -> Result<(), StoreError>;

    /// Returns true if the actor is on the privileged allow-list.
    async fn is_privileged(&self, actor: ActorId) -> Result<bool, StoreError>;

    /// Sets or clears an actor's ban. Returns false if the actor is
    /// unknown.
    async fn set_banned(&self, actor: ActorId, banned: bool) -> Result<bool, StoreError>;

    /// Saves a new recipe and returns its id.
    async fn save_recipe(
        &self,
        fields: RecipeFields,
        owner: ActorId,
    ) -> Result<RecipeId, StoreError>;

    /// Replaces a recipe's fields. Returns false if the recipe does not
    /// exist or is not owned by `owner`.
    async fn update_recipe(
        &self,
        id: RecipeId,
        owner: ActorId,
        fields: RecipeFields,
    ) -> Result<bool, StoreError>;

    /// Fetches a recipe by id.
    async fn recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError>;

    /// Lists an actor's recipes, newest first.
    async fn recipes_by_owner(&self, owner: ActorId) -> Result<Vec<Recipe>, StoreError>;

    /// Searches recipes by case-insensitive substring over title,
    /// ingredients, and instructions; newest first.
    async fn search_recipes(&self, term: &str) -> Result<Vec<Recipe>, StoreError>;

    /// Stores an actor's latest health metric value.
    async fn save_metric(&self, actor: ActorId, value: f64) -> Result<(), StoreError>;

    /// Fetches an actor's profile, if registered.
    async fn profile(&self, actor: ActorId) -> Result<Option<Profile>, StoreError>;
}
