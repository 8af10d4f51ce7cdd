//! In-memory reference implementation of the record store.
//!
//! Backs the demo binary and the test suites. Data lives in RwLock'd maps
//! and dies with the process.

use crate::entity::{Profile, Recipe, RecipeFields};
use crate::error::StoreError;
use crate::record::RecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use saffron_core::{ActorId, RecipeId};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct UserRecord {
    display_name: String,
    username: String,
    joined_at: DateTime<Utc>,
    banned: bool,
    metric: Option<f64>,
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<ActorId, UserRecord>>,
    recipes: RwLock<HashMap<RecipeId, Recipe>>,
    admins: HashSet<ActorId>,
}

impl MemoryStore {
    /// Creates an empty store with no privileged actors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given privileged allow-list.
    #[must_use]
    pub fn with_admins(admins: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            ..Self::default()
        }
    }

    fn newest_first(mut recipes: Vec<Recipe>) -> Vec<Recipe> {
        recipes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_ulid().cmp(&a.id.as_ulid()))
        });
        recipes
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn is_registered(&self, actor: ActorId) -> Result<bool, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&actor).is_some_and(|user| !user.banned))
    }

    async fn register(
        &self,
        actor: ActorId,
        display_name: &str,
        username: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        users.entry(actor).or_insert_with(|| UserRecord {
            display_name: display_name.to_string(),
            username: username.to_string(),
            joined_at: Utc::now(),
            banned: false,
            metric: None,
        });
        Ok(())
    }

    async fn is_privileged(&self, actor: ActorId) -> Result<bool, StoreError> {
        Ok(self.admins.contains(&actor))
    }

    async fn set_banned(&self, actor: ActorId, banned: bool) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&actor) {
            Some(user) => {
                user.banned = banned;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save_recipe(
        &self,
        fields: RecipeFields,
        owner: ActorId,
    ) -> Result<RecipeId, StoreError> {
        let id = RecipeId::new();
        let now = Utc::now();
        let recipe = Recipe {
            id,
            owner,
            fields,
            created_at: now,
            updated_at: now,
        };
        self.recipes.write().await.insert(id, recipe);
        Ok(id)
    }

    async fn update_recipe(
        &self,
        id: RecipeId,
        owner: ActorId,
        fields: RecipeFields,
    ) -> Result<bool, StoreError> {
        let mut recipes = self.recipes.write().await;
        match recipes.get_mut(&id) {
            Some(recipe) if recipe.owner == owner => {
                recipe.fields = fields;
                recipe.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes.read().await.get(&id).cloned())
    }

    async fn recipes_by_owner(&self, owner: ActorId) -> Result<Vec<Recipe>, StoreError> {
        let recipes = self.recipes.read().await;
        let owned = recipes
            .values()
            .filter(|recipe| recipe.owner == owner)
            .cloned()
            .collect();
        Ok(Self::newest_first(owned))
    }

    async fn search_recipes(&self, term: &str) -> Result<Vec<Recipe>, StoreError> {
        let term = term.to_lowercase();
        let recipes = self.recipes.read().await;
        let found = recipes
            .values()
            .filter(|recipe| recipe.matches(&term))
            .cloned()
            .collect();
        Ok(Self::newest_first(found))
    }

    async fn save_metric(&self, actor: ActorId, value: f64) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        users
            .entry(actor)
            .and_modify(|user| user.metric = Some(value))
            .or_insert_with(|| UserRecord {
                display_name: String::new(),
                username: String::new(),
                joined_at: Utc::now(),
                banned: false,
                metric: Some(value),
            });
        Ok(())
    }

    async fn profile(&self, actor: ActorId) -> Result<Option<Profile>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&actor).map(|user| Profile {
            display_name: user.display_name.clone(),
            username: user.username.clone(),
            joined_at: user.joined_at,
            active: !user.banned,
        }))
    }
}
