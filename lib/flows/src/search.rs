//! Search flow: `/search_recipes` with a self-looping query state.
//!
//! Every search leaves the session in the query state so the next message
//! searches again; only the cancel fallback leaves the flow. Terms
//! shorter than two characters re-prompt without touching the store.

use crate::draft::{Draft, SearchDraft};
use crate::render;
use crate::support::{cancel_handler, persistence, require_text, say};
use crate::text;
use async_trait::async_trait;
use saffron_access::require_auth;
use saffron_dialogue::{
    Event, Flow, HandlerError, Reply, SinkError, StateHandler, StateId, Transition, TriggerPattern,
};
use saffron_store::{Recipe, RecordStore};
use std::sync::Arc;
use tracing::debug;

pub const QUERY: StateId = StateId::new("search_query");

/// Minimum query length, in characters (not bytes).
const MIN_QUERY_CHARS: usize = 2;

#[derive(Clone, Copy)]
enum Step {
    Start,
    Query,
}

struct SearchHandler {
    store: Arc<dyn RecordStore>,
    step: Step,
}

impl SearchHandler {
    /// Sends one result card; photo attachments degrade to a text note
    /// when the media cannot be read.
    async fn send_result(&self, event: &Event, recipe: &Recipe) -> Result<(), HandlerError> {
        let chef = self
            .store
            .profile(recipe.owner)
            .await
            .map_err(persistence)?
            .map(|profile| profile.username);
        let mut card = render::recipe_preview(recipe, Some(chef.as_deref().unwrap_or(text::UNKNOWN_CHEF)));
        if let Some(photo) = recipe.fields.photo.clone() {
            card.media = Some(saffron_dialogue::MediaAttachment {
                kind: saffron_core::MediaKind::Photo,
                media: photo,
            });
        }

        match event.reply(card.clone()).await {
            Ok(()) => Ok(()),
            Err(SinkError::MediaUnavailable { .. }) => {
                card.media = None;
                say(event, card).await
            }
            Err(err) => Err(HandlerError::Internal {
                reason: err.to_string(),
            }),
        }
    }
}

#[async_trait]
impl StateHandler<Draft> for SearchHandler {
    async fn handle(&self, event: &Event, draft: &mut Draft) -> Result<Transition, HandlerError> {
        match self.step {
            Step::Start => {
                *draft = Draft::Search(SearchDraft);
                say(event, Reply::text(text::SEARCH_INTRO)).await?;
                Ok(Transition::To(QUERY))
            }
            Step::Query => {
                let term = require_text(event)?.trim().to_string();
                if term.chars().count() < MIN_QUERY_CHARS {
                    say(event, Reply::text(text::SEARCH_TOO_SHORT)).await?;
                    return Ok(Transition::To(QUERY));
                }

                let results = self
                    .store
                    .search_recipes(&term)
                    .await
                    .map_err(persistence)?;
                debug!(term = %term, results = results.len(), "recipe search");

                if results.is_empty() {
                    say(event, Reply::text(text::SEARCH_NO_RESULTS)).await?;
                    return Ok(Transition::To(QUERY));
                }

                say(event, Reply::text(format!("🔍 {} result(s):", results.len()))).await?;
                for recipe in &results {
                    self.send_result(event, recipe).await?;
                }
                say(event, Reply::text(text::SEARCH_AGAIN_HINT)).await?;
                Ok(Transition::To(QUERY))
            }
        }
    }
}

/// Builds the search flow.
#[must_use]
pub fn flow(store: Arc<dyn RecordStore>) -> Flow<Draft> {
    let handler = |step| {
        Arc::new(SearchHandler {
            store: store.clone(),
            step,
        }) as Arc<dyn StateHandler<Draft>>
    };

    Flow::new("search")
        .with_entry_point(
            TriggerPattern::Command("search_recipes"),
            require_auth(store.clone(), handler(Step::Start)),
        )
        .with_state(QUERY, TriggerPattern::Text, handler(Step::Query))
        .with_fallback(TriggerPattern::Command("cancel"), cancel_handler())
}
