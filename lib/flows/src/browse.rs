//! Browse flow: listing, viewing, and the profile card.
//!
//! Three entry-only operations that terminate at entry: `/my_recipes`,
//! the `view_recipe_<id>` callback, and `/profile`. Viewing delivers any
//! attached media with a per-item degrade to a text note when the media
//! cannot be read.

use crate::draft::Draft;
use crate::render;
use crate::support::{persistence, require_callback, say};
use crate::text;
use crate::token::{CallbackToken, VIEW_RECIPE};
use async_trait::async_trait;
use saffron_access::require_auth;
use saffron_core::{MediaKind, MediaRef};
use saffron_dialogue::{
    Event, Flow, HandlerError, Keyboard, KeyboardButton, Reply, SinkError, StateHandler,
    Transition, TriggerPattern,
};
use saffron_store::RecordStore;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone, Copy)]
enum Step {
    MyRecipes,
    View,
    Profile,
}

struct BrowseHandler {
    store: Arc<dyn RecordStore>,
    step: Step,
}

/// Sends a media reply, degrading to a text note if the media is gone.
async fn send_media_or_note(
    event: &Event,
    kind: MediaKind,
    media: MediaRef,
) -> Result<(), HandlerError> {
    match event.reply(Reply::media(kind, media)).await {
        Ok(()) => Ok(()),
        Err(SinkError::MediaUnavailable { media }) => {
            warn!(media = %media, "media unavailable, sending text note");
            say(event, Reply::text(text::MEDIA_UNAVAILABLE)).await
        }
        Err(err) => Err(HandlerError::Internal {
            reason: err.to_string(),
        }),
    }
}

#[async_trait]
impl StateHandler<Draft> for BrowseHandler {
    async fn handle(&self, event: &Event, _draft: &mut Draft) -> Result<Transition, HandlerError> {
        match self.step {
            Step::MyRecipes => {
                let recipes = self
                    .store
                    .recipes_by_owner(event.actor())
                    .await
                    .map_err(persistence)?;
                if recipes.is_empty() {
                    say(event, Reply::text(text::NO_RECIPES_YET)).await?;
                    return Ok(Transition::End);
                }

                say(event, Reply::text(text::MY_RECIPES_HEADER)).await?;
                for recipe in &recipes {
                    say(event, render::recipe_preview(recipe, None)).await?;
                }
                Ok(Transition::End)
            }
            Step::View => {
                let token = require_callback(event)?;
                let CallbackToken::ViewRecipe(id) =
                    CallbackToken::parse(token).map_err(|err| HandlerError::Internal {
                        reason: err.to_string(),
                    })?
                else {
                    return Err(HandlerError::Internal {
                        reason: "view handler reached with a non-view token".to_string(),
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

                let mut reply = Reply::text(render::recipe_details(&recipe));
                if recipe.owner == event.actor() {
                    reply = reply.with_keyboard(Keyboard::new().with_row(vec![
                        KeyboardButton::callback(
                            text::BUTTON_EDIT,
                            CallbackToken::EditRecipe(recipe.id).encode(),
                        ),
                    ]));
                }
                say(event, reply).await?;

                if let Some(photo) = recipe.fields.photo.clone() {
                    send_media_or_note(event, MediaKind::Photo, photo).await?;
                }
                if let Some(voice) = recipe.fields.voice.clone() {
                    send_media_or_note(event, MediaKind::Voice, voice).await?;
                }
                Ok(Transition::End)
            }
            Step::Profile => {
                let profile = self
                    .store
                    .profile(event.actor())
                    .await
                    .map_err(persistence)?
                    .ok_or_else(|| HandlerError::NotFound {
                        what: "profile".to_string(),
                    })?;
                say(event, Reply::text(render::profile_card(&profile))).await?;
                Ok(Transition::End)
            }
        }
    }
}

/// Builds the browse flow.
#[must_use]
pub fn flow(store: Arc<dyn RecordStore>) -> Flow<Draft> {
    let handler = |step| {
        Arc::new(BrowseHandler {
            store: store.clone(),
            step,
        }) as Arc<dyn StateHandler<Draft>>
    };

    Flow::new("browse")
        .with_entry_point(
            TriggerPattern::Command("my_recipes"),
            require_auth(store.clone(), handler(Step::MyRecipes)),
        )
        .with_entry_point(
            TriggerPattern::CallbackPrefix(VIEW_RECIPE),
            handler(Step::View),
        )
        .with_entry_point(
            TriggerPattern::Command("profile"),
            require_auth(store.clone(), handler(Step::Profile)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        cb, cmd, create_recipe, engine_with_all, event, event_from, register_actor, RecordingSink,
    };
    use saffron_core::RecipeId;
    use saffron_dialogue::{Engine, Payload};
    use saffron_store::{MemoryStore, RecipeFields};

    async fn setup() -> (Arc<MemoryStore>, Engine<Draft>, Arc<RecordingSink>) {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with_all(store.clone());
        let sink = Arc::new(RecordingSink::default());
        register_actor(store.as_ref()).await;
        (store, engine, sink)
    }

    #[tokio::test]
    async fn empty_listing_says_so() {
        let (_store, engine, sink) = setup().await;

        engine.dispatch(event(cmd("my_recipes"), &sink)).await;

        assert!(sink.contains_text(text::NO_RECIPES_YET));
        assert_eq!(engine.active_sessions(), 0);
    }

    #[tokio::test]
    async fn listing_shows_newest_first_with_view_buttons() {
        let (store, engine, sink) = setup().await;
        create_recipe(&engine, store.as_ref(), &sink, "Older").await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        create_recipe(&engine, store.as_ref(), &sink, "Newer").await;

        let listing_sink = Arc::new(RecordingSink::default());
        engine.dispatch(event(cmd("my_recipes"), &listing_sink)).await;

        let cards: Vec<String> = listing_sink
            .texts()
            .into_iter()
            .filter(|text| text.starts_with("🍳"))
            .collect();
        assert_eq!(cards.len(), 2);
        assert!(cards[0].contains("Newer"));
        assert!(cards[1].contains("Older"));
    }

    #[tokio::test]
    async fn view_shows_details_with_edit_button_for_the_owner() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Kashke Bademjan").await;

        let view_sink = Arc::new(RecordingSink::default());
        engine
            .dispatch(event(
                cb(CallbackToken::ViewRecipe(recipe.id).encode()),
                &view_sink,
            ))
            .await;

        assert!(view_sink.contains_text("Kashke Bademjan"));
        let sent = view_sink.sent.lock().unwrap();
        let details = sent.iter().find(|reply| reply.text.is_some()).unwrap();
        assert!(details.keyboard.is_some());
    }

    #[tokio::test]
    async fn view_hides_the_edit_button_from_strangers() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Mirza Ghasemi").await;

        let stranger_sink = Arc::new(RecordingSink::default());
        engine
            .dispatch(event_from(
                200,
                999,
                cb(CallbackToken::ViewRecipe(recipe.id).encode()),
                &stranger_sink,
            ))
            .await;

        assert!(stranger_sink.contains_text("Mirza Ghasemi"));
        let sent = stranger_sink.sent.lock().unwrap();
        let details = sent.iter().find(|reply| reply.text.is_some()).unwrap();
        assert!(details.keyboard.is_none());
    }

    #[tokio::test]
    async fn view_of_missing_recipe_reports_not_found() {
        let (_store, engine, sink) = setup().await;

        engine
            .dispatch(event(
                cb(CallbackToken::ViewRecipe(RecipeId::new()).encode()),
                &sink,
            ))
            .await;

        assert!(sink.contains_text("couldn't find"));
    }

    #[tokio::test]
    async fn view_degrades_to_text_when_media_is_unavailable() {
        let (store, engine, sink) = setup().await;
        let recipe = create_recipe(&engine, store.as_ref(), &sink, "Shole Zard").await;

        // Attach a photo directly in the store.
        let mut fields: RecipeFields = recipe.fields.clone();
        fields.photo = Some(saffron_core::MediaRef::new("gone"));
        assert!(
            store
                .update_recipe(recipe.id, recipe.owner, fields)
                .await
                .unwrap()
        );

        let failing_sink = Arc::new(RecordingSink {
            fail_media: true,
            ..RecordingSink::default()
        });
        let outcome = engine
            .dispatch(event(
                cb(CallbackToken::ViewRecipe(recipe.id).encode()),
                &failing_sink,
            ))
            .await;

        assert!(outcome.is_handled());
        assert!(failing_sink.contains_text(text::MEDIA_UNAVAILABLE));
        assert_eq!(failing_sink.media_count(), 0);
    }

    #[tokio::test]
    async fn profile_renders_the_stored_record() {
        let (_store, engine, sink) = setup().await;

        engine.dispatch(event(cmd("profile"), &sink)).await;

        assert!(sink.contains_text("Username: tester"));
        assert!(sink.contains_text("active ✅"));
    }

    #[tokio::test]
    async fn view_tokens_are_not_free_text() {
        let (_store, engine, sink) = setup().await;

        // The same characters as free text must not trigger the view
        // entry point.
        let outcome = engine
            .dispatch(event(
                Payload::text(CallbackToken::ViewRecipe(RecipeId::new()).encode()),
                &sink,
            ))
            .await;

        assert!(!outcome.is_handled());
    }
}
