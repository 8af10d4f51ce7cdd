//! Conversation flows for the saffron recipe assistant.
//!
//! Each module declares one flow as data — entry points, states,
//! fallbacks — over a shared tagged [`Draft`] union:
//!
//! - **registration**: `/start`, username capture
//! - **recipe_create**: `/add_recipe`, the full submission chain
//! - **recipe_edit**: callback-driven field-by-field editing
//! - **bmi**: `/calculate_bmi`, height/weight and the verdict
//! - **search**: `/search_recipes`, a self-looping query state
//! - **browse**: `/my_recipes`, recipe viewing, `/profile`
//! - **moderation**: `/ban_user` (reason-collecting) and `/ban_now`

pub mod bmi;
pub mod browse;
pub mod draft;
pub mod moderation;
pub mod recipe_create;
pub mod recipe_edit;
pub mod registration;
pub mod search;
pub mod token;

mod render;
mod support;
pub mod text;

#[cfg(test)]
pub(crate) mod testutil;

pub use draft::{BanDraft, BmiDraft, Draft, EditDraft, RecipeDraft, RegistrationDraft, SearchDraft};
pub use token::{CallbackToken, EditField, TokenError};

use saffron_dialogue::{Engine, EngineError};
use saffron_store::RecordStore;
use std::sync::Arc;

/// Registers every flow, in the order the assistant wires them.
///
/// The recipe-edit flow goes first so its callback tokens are never
/// shadowed; the rest follow the original registration order.
///
/// # Errors
///
/// Returns an [`EngineError`] if any definition fails validation, which
/// would be a bug in this crate.
pub fn register_all(
    engine: &mut Engine<Draft>,
    store: &Arc<dyn RecordStore>,
) -> Result<(), EngineError> {
    engine.register(recipe_edit::flow(store.clone()))?;
    engine.register(browse::flow(store.clone()))?;
    engine.register(registration::flow(store.clone()))?;
    engine.register(moderation::flow(store.clone()))?;
    engine.register(recipe_create::flow(store.clone()))?;
    engine.register(bmi::flow(store.clone()))?;
    engine.register(search::flow(store.clone()))?;
    Ok(())
}
