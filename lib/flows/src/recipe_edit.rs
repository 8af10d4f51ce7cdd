//! Recipe-edit flow: callback-driven, field-by-field editing.
//!
//! Unlike the creation chain this is a revisitable graph: entry loads the
//! recipe and shows a menu; picking a field leads to a dedicated
//! single-field state whose success path returns to the menu, so several
//! fields can be edited in one session. The recipe id is captured once at
//! entry and every commit goes against it. Re-entry is enabled so a new
//! edit tap always restarts cleanly.

use crate::draft::{Draft, EditDraft};
use crate::render;
use crate::support::{cancel_handler, persistence, require_callback, require_text, say};
use crate::text;
use crate::token::{CallbackToken, EditField, EDIT_CANCEL, EDIT_FIELD, EDIT_RECIPE, EDIT_REMOVE};
use async_trait::async_trait;
use saffron_core::MediaKind;
use saffron_dialogue::{
    Event, Flow, HandlerError, Reply, StateHandler, StateId, Transition, TriggerPattern,
};
use saffron_store::RecordStore;
use std::sync::Arc;

/// The menu state every successful edit returns to.
pub const EDIT_MENU: StateId = StateId::new("edit_menu");
pub const EDIT_TITLE: StateId = StateId::new("edit_title");
pub const EDIT_INGREDIENTS: StateId = StateId::new("edit_ingredients");
pub const EDIT_COOKING_TIME: StateId = StateId::new("edit_cooking_time");
pub const EDIT_SKILL_LEVEL: StateId = StateId::new("edit_skill_level");
pub const EDIT_CALORIES: StateId = StateId::new("edit_calories");
pub const EDIT_INSTRUCTIONS: StateId = StateId::new("edit_instructions");
pub const EDIT_PHOTO: StateId = StateId::new("edit_photo");
pub const EDIT_VOICE: StateId = StateId::new("edit_voice");

fn state_for(field: EditField) -> StateId {
    match field {
        EditField::Title => EDIT_TITLE,
        EditField::Ingredients => EDIT_INGREDIENTS,
        EditField::CookingTime => EDIT_COOKING_TIME,
        EditField::SkillLevel => EDIT_SKILL_LEVEL,
        EditField::Calories => EDIT_CALORIES,
        EditField::Instructions => EDIT_INSTRUCTIONS,
        EditField::Photo => EDIT_PHOTO,
        EditField::Voice => EDIT_VOICE,
    }
}

fn label_for(field: EditField) -> &'static str {
    match field {
        EditField::Title => text::BUTTON_TITLE,
        EditField::Ingredients => text::BUTTON_INGREDIENTS,
        EditField::CookingTime => text::BUTTON_COOKING_TIME,
        EditField::SkillLevel => text::BUTTON_SKILL_LEVEL,
        EditField::Calories => text::BUTTON_CALORIES,
        EditField::Instructions => text::BUTTON_INSTRUCTIONS,
        EditField::Photo => "Photo",
        EditField::Voice => "Voice",
    }
}

fn prompt_for(field: EditField) -> Reply {
    match field {
        EditField::Title => Reply::text(text::EDIT_PROMPT_TITLE),
        EditField::Ingredients => Reply::text(text::EDIT_PROMPT_INGREDIENTS),
        EditField::CookingTime => Reply::text(text::EDIT_PROMPT_COOKING_TIME),
        EditField::SkillLevel => {
            Reply::text(text::EDIT_PROMPT_SKILL_LEVEL).with_keyboard(render::skill_keyboard())
        }
        EditField::Calories => Reply::text(text::EDIT_PROMPT_CALORIES),
        EditField::Instructions => Reply::text(text::EDIT_PROMPT_INSTRUCTIONS),
        EditField::Photo => Reply::text(text::EDIT_PROMPT_PHOTO),
        EditField::Voice => Reply::text(text::EDIT_PROMPT_VOICE),
    }
}

#[derive(Clone, Copy)]
enum Step {
    /// `edit_recipe_<id>`: load the recipe and show the menu.
    Entry,
    /// `edit_field_…` / `edit_cancel_…` taps in the menu.
    Select,
    /// Apply new input for one field, commit, return to the menu.
    Apply(EditField),
    /// `/skip` inside a media state: leave the field as it was.
    Skip,
    /// `edit_remove_…` fallback: clear a media field, commit, terminate.
    Remove,
}

struct EditHandler {
    store: Arc<dyn RecordStore>,
    step: Step,
}

impl EditHandler {
    fn decode(event: &Event) -> Result<CallbackToken, HandlerError> {
        let token = require_callback(event)?;
        CallbackToken::parse(token).map_err(|err| HandlerError::Internal {
            reason: err.to_string(),
        })
    }

    /// Commits the working copy against the entry-captured recipe id and
    /// re-shows the menu.
    async fn commit_and_menu(
        &self,
        event: &Event,
        draft: &mut Draft,
        saved: String,
    ) -> Result<Transition, HandlerError> {
        let edit = draft.as_edit_mut()?;
        let updated = self
            .store
            .update_recipe(edit.recipe_id, event.actor(), edit.fields.clone())
            .await
            .map_err(persistence)?;
        if !updated {
            return Err(HandlerError::Permission);
        }
        say(event, Reply::text(saved)).await?;
        say(event, render::edit_menu(edit.recipe_id, &edit.fields)).await?;
        Ok(Transition::To(EDIT_MENU))
    }

    async fn apply(
        &self,
        field: EditField,
        event: &Event,
        draft: &mut Draft,
    ) -> Result<Transition, HandlerError> {
        match field {
            EditField::Title => {
                draft.as_edit_mut()?.fields.title = require_text(event)?.to_string();
            }
            EditField::Ingredients => {
                draft.as_edit_mut()?.fields.ingredients = require_text(event)?.to_string();
            }
            EditField::CookingTime => {
                let Ok(minutes) = require_text(event)?.trim().parse::<u32>() else {
                    say(event, Reply::text(text::INVALID_NUMBER)).await?;
                    return Ok(Transition::To(EDIT_COOKING_TIME));
                };
                draft.as_edit_mut()?.fields.cooking_time_minutes = minutes;
            }
            EditField::SkillLevel => {
                draft.as_edit_mut()?.fields.skill_level = require_text(event)?.to_string();
            }
            EditField::Calories => {
                let Ok(calories) = require_text(event)?.trim().parse::<u32>() else {
                    say(event, Reply::text(text::INVALID_NUMBER)).await?;
                    return Ok(Transition::To(EDIT_CALORIES));
                };
                draft.as_edit_mut()?.fields.calories = calories;
            }
            EditField::Instructions => {
                draft.as_edit_mut()?.fields.instructions = require_text(event)?.to_string();
            }
            EditField::Photo => {
                if let Some((MediaKind::Photo, media)) = event.payload().as_media() {
                    draft.as_edit_mut()?.fields.photo = Some(media.clone());
                }
            }
            EditField::Voice => {
                if let Some((MediaKind::Voice, media)) = event.payload().as_media() {
                    draft.as_edit_mut()?.fields.voice = Some(media.clone());
                }
            }
        }
        self.commit_and_menu(event, draft, format!("{} {}", label_for(field), text::EDIT_SAVED))
            .await
    }
}

#[async_trait]
impl StateHandler<Draft> for EditHandler {
    async fn handle(&self, event: &Event, draft: &mut Draft) -> Result<Transition, HandlerError> {
        match self.step {
            Step::Entry => {
                let CallbackToken::EditRecipe(id) = Self::decode(event)? else {
                    return Err(HandlerError::Internal {
                        reason: "edit entry reached with a non-entry token".to_string(),
                    });
                };
                let recipe = self
                    .store
                    .recipe(id)
                    .await
                    .map_err(persistence)?
                    .ok_or_else(|| HandlerError::NotFound {
                        what: format!("recipe {id}"),
                    })?;

                *draft = Draft::Edit(EditDraft {
                    recipe_id: id,
                    fields: recipe.fields,
                });
                let edit = draft.as_edit_mut()?;
                say(event, render::edit_menu(edit.recipe_id, &edit.fields)).await?;
                Ok(Transition::To(EDIT_MENU))
            }
            Step::Select => match Self::decode(event)? {
                CallbackToken::EditField(_, field) => {
                    say(event, prompt_for(field)).await?;
                    Ok(Transition::To(state_for(field)))
                }
                CallbackToken::EditCancel(_) => {
                    say(event, Reply::text(text::EDIT_CANCELLED)).await?;
                    Ok(Transition::End)
                }
                other => Err(HandlerError::Internal {
                    reason: format!("unexpected token in edit menu: {other:?}"),
                }),
            },
            Step::Apply(field) => self.apply(field, event, draft).await,
            Step::Skip => {
                say(event, Reply::text(text::EDIT_SKIPPED)).await?;
                Ok(Transition::End)
            }
            Step::Remove => {
                let CallbackToken::RemoveMedia(_, kind) = Self::decode(event)? else {
                    return Err(HandlerError::Internal {
                        reason: "remove fallback reached with a non-remove token".to_string(),
                    });
                };
                let edit = draft.as_edit_mut()?;
                let confirmation = match kind {
                    MediaKind::Photo => {
                        edit.fields.photo = None;
                        text::PHOTO_REMOVED
                    }
                    MediaKind::Voice => {
                        edit.fields.voice = None;
                        text::VOICE_REMOVED
                    }
                };
                let updated = self
                    .store
                    .update_recipe(edit.recipe_id, event.actor(), edit.fields.clone())
                    .await
                    .map_err(persistence)?;
                if !updated {
                    return Err(HandlerError::Permission);
                }
                say(event, Reply::text(confirmation)).await?;
                Ok(Transition::End)
            }
        }
    }
}

/// Builds the recipe-edit flow.
#[must_use]
pub fn flow(store: Arc<dyn RecordStore>) -> Flow<Draft> {
    let handler = |step| {
        Arc::new(EditHandler {
            store: store.clone(),
            step,
        }) as Arc<dyn StateHandler<Draft>>
    };

    Flow::new("recipe_edit")
        .with_entry_point(TriggerPattern::CallbackPrefix(EDIT_RECIPE), handler(Step::Entry))
        .with_state(
            EDIT_MENU,
            TriggerPattern::CallbackPrefix(EDIT_FIELD),
            handler(Step::Select),
        )
        .with_state(
            EDIT_MENU,
            TriggerPattern::CallbackPrefix(EDIT_CANCEL),
            handler(Step::Select),
        )
        .with_state(EDIT_TITLE, TriggerPattern::Text, handler(Step::Apply(EditField::Title)))
        .with_state(
            EDIT_INGREDIENTS,
            TriggerPattern::Text,
            handler(Step::Apply(EditField::Ingredients)),
        )
        .with_state(
            EDIT_COOKING_TIME,
            TriggerPattern::Text,
            handler(Step::Apply(EditField::CookingTime)),
        )
        .with_state(
            EDIT_SKILL_LEVEL,
            TriggerPattern::Text,
            handler(Step::Apply(EditField::SkillLevel)),
        )
        .with_state(
            EDIT_CALORIES,
            TriggerPattern::Text,
            handler(Step::Apply(EditField::Calories)),
        )
        .with_state(
            EDIT_INSTRUCTIONS,
            TriggerPattern::Text,
            handler(Step::Apply(EditField::Instructions)),
        )
        .with_state(
            EDIT_PHOTO,
            TriggerPattern::Media(MediaKind::Photo),
            handler(Step::Apply(EditField::Photo)),
        )
        .with_state(EDIT_PHOTO, TriggerPattern::Command("skip"), handler(Step::Skip))
        .with_state(
            EDIT_VOICE,
            TriggerPattern::Media(MediaKind::Voice),
            handler(Step::Apply(EditField::Voice)),
        )
        .with_state(EDIT_VOICE, TriggerPattern::Command("skip"), handler(Step::Skip))
        .with_fallback(TriggerPattern::Command("cancel"), cancel_handler())
        .with_fallback(TriggerPattern::CallbackPrefix(EDIT_REMOVE), handler(Step::Remove))
        .with_reentry(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        cb, cmd, create_recipe, engine_with_all, event, event_from, photo, register_actor, txt,
        RecordingSink, CHAT,
    };
    use saffron_core::{ChatId, MediaRef};
    use saffron_dialogue::{ConversationId, FlowName};
    use saffron_store::MemoryStore;

    fn conversation() -> ConversationId {
        ConversationId::per_chat(ChatId::new(CHAT))
    }

    fn edit_flow_name() -> FlowName {
        FlowName::new("recipe_edit")
    }

    async fn setup() -> (
        std::sync::Arc<MemoryStore>,
        saffron_dialogue::Engine<Draft>,
        std::sync::Arc<RecordingSink>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with_all(store.clone());
        let sink = Arc::new(RecordingSink::default());
        register_actor(store.as_ref()).await;
        (store, engine, sink)
    }

    #[tokio::test]
    async fn entry_shows_menu_and_waits() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Ghormeh Sabzi").await;

        let token = CallbackToken::EditRecipe(recipe.id).encode();
        let outcome = engine.dispatch(event(cb(token), &sink)).await;

        assert!(outcome.is_handled());
        assert!(sink.contains_text(text::EDIT_MENU_PROMPT));
        let info = engine
            .session_info(&edit_flow_name(), conversation())
            .expect("edit session");
        assert_eq!(info.state, Some(EDIT_MENU));
    }

    #[tokio::test]
    async fn unknown_recipe_ends_with_not_found() {
        let (_store, engine, sink) = setup().await;

        let token = CallbackToken::EditRecipe(saffron_core::RecipeId::new()).encode();
        engine.dispatch(event(cb(token), &sink)).await;

        assert!(sink.contains_text("couldn't find"));
        assert_eq!(engine.active_sessions(), 0);
    }

    #[tokio::test]
    async fn multiple_fields_apply_against_the_entry_recipe() {
        let (store, engine, sink) = setup().await;
        let first = create_recipe(&engine, store.as_ref(), &sink, "First").await;
        let second = create_recipe(&engine, store.as_ref(), &sink, "Second").await;

        // Open the edit menu for the FIRST recipe.
        engine
            .dispatch(event(cb(CallbackToken::EditRecipe(first.id).encode()), &sink))
            .await;

        // Edit the title, return to the menu, then edit the calories.
        engine
            .dispatch(event(
                cb(CallbackToken::EditField(first.id, EditField::Title).encode()),
                &sink,
            ))
            .await;
        engine.dispatch(event(txt("First, improved"), &sink)).await;

        let info = engine
            .session_info(&edit_flow_name(), conversation())
            .expect("back in the menu");
        assert_eq!(info.state, Some(EDIT_MENU));

        engine
            .dispatch(event(
                cb(CallbackToken::EditField(first.id, EditField::Calories).encode()),
                &sink,
            ))
            .await;
        engine.dispatch(event(txt("999"), &sink)).await;

        // Both edits landed on the recipe captured at entry.
        let edited = store.recipe(first.id).await.unwrap().expect("first");
        assert_eq!(edited.fields.title, "First, improved");
        assert_eq!(edited.fields.calories, 999);
        let untouched = store.recipe(second.id).await.unwrap().expect("second");
        assert_eq!(untouched.fields.title, "Second");
        assert_eq!(untouched.fields.calories, 250);
    }

    #[tokio::test]
    async fn invalid_calories_reprompts_in_place() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Halim").await;

        engine
            .dispatch(event(cb(CallbackToken::EditRecipe(recipe.id).encode()), &sink))
            .await;
        engine
            .dispatch(event(
                cb(CallbackToken::EditField(recipe.id, EditField::Calories).encode()),
                &sink,
            ))
            .await;
        engine.dispatch(event(txt("lots"), &sink)).await;

        assert_eq!(sink.last_text().as_deref(), Some(text::INVALID_NUMBER));
        let info = engine
            .session_info(&edit_flow_name(), conversation())
            .expect("still editing");
        assert_eq!(info.state, Some(EDIT_CALORIES));

        let unchanged = store.recipe(recipe.id).await.unwrap().expect("recipe");
        assert_eq!(unchanged.fields.calories, 250);
    }

    #[tokio::test]
    async fn cancel_token_leaves_the_menu() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Dolmeh").await;

        engine
            .dispatch(event(cb(CallbackToken::EditRecipe(recipe.id).encode()), &sink))
            .await;
        engine
            .dispatch(event(cb(CallbackToken::EditCancel(recipe.id).encode()), &sink))
            .await;

        assert!(sink.contains_text(text::EDIT_CANCELLED));
        assert_eq!(engine.active_sessions(), 0);
    }

    #[tokio::test]
    async fn remove_media_fallback_clears_and_terminates() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Baghali Polo").await;

        // Give the recipe a photo first, through the edit flow itself.
        engine
            .dispatch(event(cb(CallbackToken::EditRecipe(recipe.id).encode()), &sink))
            .await;
        engine
            .dispatch(event(
                cb(CallbackToken::EditField(recipe.id, EditField::Photo).encode()),
                &sink,
            ))
            .await;
        engine.dispatch(event(photo("p_7"), &sink)).await;
        let with_photo = store.recipe(recipe.id).await.unwrap().expect("recipe");
        assert_eq!(with_photo.fields.photo, Some(MediaRef::new("p_7")));

        // The remove token fires as a fallback from the menu state.
        engine
            .dispatch(event(
                cb(CallbackToken::RemoveMedia(recipe.id, MediaKind::Photo).encode()),
                &sink,
            ))
            .await;

        assert!(sink.contains_text(text::PHOTO_REMOVED));
        assert_eq!(engine.active_sessions(), 0);
        let cleared = store.recipe(recipe.id).await.unwrap().expect("recipe");
        assert_eq!(cleared.fields.photo, None);
    }

    #[tokio::test]
    async fn skip_leaves_media_edit_without_changes() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Zereshk Polo").await;

        engine
            .dispatch(event(cb(CallbackToken::EditRecipe(recipe.id).encode()), &sink))
            .await;
        engine
            .dispatch(event(
                cb(CallbackToken::EditField(recipe.id, EditField::Photo).encode()),
                &sink,
            ))
            .await;
        engine.dispatch(event(cmd("skip"), &sink)).await;

        assert!(sink.contains_text(text::EDIT_SKIPPED));
        assert_eq!(engine.active_sessions(), 0);
        let unchanged = store.recipe(recipe.id).await.unwrap().expect("recipe");
        assert_eq!(unchanged.fields.photo, None);
    }

    #[tokio::test]
    async fn reentry_restarts_with_a_new_recipe() {
        let (store, engine, sink) = setup().await;
        let first = create_recipe(&engine, store.as_ref(), &sink, "Adas Polo").await;
        let second = create_recipe(&engine, store.as_ref(), &sink, "Shirin Polo").await;

        engine
            .dispatch(event(cb(CallbackToken::EditRecipe(first.id).encode()), &sink))
            .await;
        // A fresh edit tap replaces the session cleanly.
        engine
            .dispatch(event(cb(CallbackToken::EditRecipe(second.id).encode()), &sink))
            .await;
        engine
            .dispatch(event(
                cb(CallbackToken::EditField(second.id, EditField::Title).encode()),
                &sink,
            ))
            .await;
        engine.dispatch(event(txt("Shirin Polo, golden"), &sink)).await;

        assert_eq!(
            store
                .recipe(second.id)
                .await
                .unwrap()
                .expect("second")
                .fields
                .title,
            "Shirin Polo, golden"
        );
        assert_eq!(
            store.recipe(first.id).await.unwrap().expect("first").fields.title,
            "Adas Polo"
        );
    }

    #[tokio::test]
    async fn strangers_cannot_commit_edits() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Fesenjan").await;

        // A different actor in a different chat opens the menu and tries
        // to edit; ownership is enforced at commit.
        let stranger_sink = Arc::new(RecordingSink::default());
        engine
            .dispatch(event_from(
                200,
                999,
                cb(CallbackToken::EditRecipe(recipe.id).encode()),
                &stranger_sink,
            ))
            .await;
        engine
            .dispatch(event_from(
                200,
                999,
                cb(CallbackToken::EditField(recipe.id, EditField::Title).encode()),
                &stranger_sink,
            ))
            .await;
        engine
            .dispatch(event_from(200, 999, txt("hijacked"), &stranger_sink))
            .await;

        assert!(stranger_sink.contains_text("permission"));
        let unchanged = store.recipe(recipe.id).await.unwrap().expect("recipe");
        assert_eq!(unchanged.fields.title, "Fesenjan");
        assert_eq!(engine.active_sessions(), 0);
    }
}
