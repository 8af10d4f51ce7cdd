//! Recipe-creation flow: the ordered submission chain behind
//! `/add_recipe`.
//!
//! Title → Ingredients → CookingTime → SkillLevel → Calories →
//! Instructions → has-voice branch → [VoiceRecord] → Photo → commit.
//! Numeric states validate their own input and re-prompt in place,
//! leaving the rest of the draft untouched.

use crate::draft::{Draft, RecipeDraft};
use crate::render;
use crate::support::{cancel_handler, persistence, require_text, say};
use crate::text;
use async_trait::async_trait;
use saffron_access::require_auth;
use saffron_dialogue::{
    Event, Flow, HandlerError, Keyboard, KeyboardButton, MediaKind, Reply, StateHandler, StateId,
    Transition, TriggerPattern,
};
use saffron_store::RecordStore;
use std::sync::Arc;

pub const TITLE: StateId = StateId::new("create_title");
pub const INGREDIENTS: StateId = StateId::new("create_ingredients");
pub const COOKING_TIME: StateId = StateId::new("create_cooking_time");
pub const SKILL_LEVEL: StateId = StateId::new("create_skill_level");
pub const CALORIES: StateId = StateId::new("create_calories");
pub const INSTRUCTIONS: StateId = StateId::new("create_instructions");
pub const HAS_VOICE: StateId = StateId::new("create_has_voice");
pub const VOICE_RECORD: StateId = StateId::new("create_voice_record");
pub const PHOTO: StateId = StateId::new("create_photo");

#[derive(Clone, Copy)]
enum Step {
    Start,
    Title,
    Ingredients,
    CookingTime,
    SkillLevel,
    Calories,
    Instructions,
    HasVoice,
    VoiceRecord,
    Photo,
}

fn yes_no_keyboard() -> Keyboard {
    Keyboard::new().with_row(vec![
        KeyboardButton::input(text::YES),
        KeyboardButton::input(text::NO),
    ])
}

struct CreateHandler {
    store: Arc<dyn RecordStore>,
    step: Step,
}

impl CreateHandler {
    async fn commit(&self, event: &Event, draft: &mut Draft) -> Result<Transition, HandlerError> {
        let fields = draft.as_recipe_mut()?.clone().into_fields()?;
        self.store
            .save_recipe(fields, event.actor())
            .await
            .map_err(persistence)?;
        say(event, Reply::text(text::RECIPE_SAVED)).await?;
        Ok(Transition::End)
    }
}

#[async_trait]
impl StateHandler<Draft> for CreateHandler {
    async fn handle(&self, event: &Event, draft: &mut Draft) -> Result<Transition, HandlerError> {
        match self.step {
            Step::Start => {
                *draft = Draft::Recipe(RecipeDraft::default());
                say(event, Reply::text(text::PROMPT_TITLE)).await?;
                Ok(Transition::To(TITLE))
            }
            Step::Title => {
                draft.as_recipe_mut()?.title = Some(require_text(event)?.to_string());
                say(event, Reply::text(text::PROMPT_INGREDIENTS)).await?;
                Ok(Transition::To(INGREDIENTS))
            }
            Step::Ingredients => {
                draft.as_recipe_mut()?.ingredients = Some(require_text(event)?.to_string());
                say(event, Reply::text(text::PROMPT_COOKING_TIME)).await?;
                Ok(Transition::To(COOKING_TIME))
            }
            Step::CookingTime => {
                let Ok(minutes) = require_text(event)?.trim().parse::<u32>() else {
                    say(event, Reply::text(text::INVALID_NUMBER)).await?;
                    return Ok(Transition::To(COOKING_TIME));
                };
                draft.as_recipe_mut()?.cooking_time_minutes = Some(minutes);
                say(
                    event,
                    Reply::text(text::PROMPT_SKILL_LEVEL).with_keyboard(render::skill_keyboard()),
                )
                .await?;
                Ok(Transition::To(SKILL_LEVEL))
            }
            Step::SkillLevel => {
                draft.as_recipe_mut()?.skill_level = Some(require_text(event)?.to_string());
                say(event, Reply::text(text::PROMPT_CALORIES)).await?;
                Ok(Transition::To(CALORIES))
            }
            Step::Calories => {
                let Ok(calories) = require_text(event)?.trim().parse::<u32>() else {
                    say(event, Reply::text(text::INVALID_NUMBER)).await?;
                    return Ok(Transition::To(CALORIES));
                };
                draft.as_recipe_mut()?.calories = Some(calories);
                say(event, Reply::text(text::PROMPT_INSTRUCTIONS)).await?;
                Ok(Transition::To(INSTRUCTIONS))
            }
            Step::Instructions => {
                draft.as_recipe_mut()?.instructions = Some(require_text(event)?.to_string());
                say(
                    event,
                    Reply::text(text::PROMPT_HAS_VOICE).with_keyboard(yes_no_keyboard()),
                )
                .await?;
                Ok(Transition::To(HAS_VOICE))
            }
            Step::HasVoice => match require_text(event)?.trim().to_lowercase().as_str() {
                text::YES => {
                    say(event, Reply::text(text::PROMPT_VOICE)).await?;
                    Ok(Transition::To(VOICE_RECORD))
                }
                text::NO => {
                    draft.as_recipe_mut()?.voice = None;
                    say(event, Reply::text(text::PROMPT_PHOTO)).await?;
                    Ok(Transition::To(PHOTO))
                }
                _ => {
                    say(
                        event,
                        Reply::text(text::PROMPT_HAS_VOICE).with_keyboard(yes_no_keyboard()),
                    )
                    .await?;
                    Ok(Transition::To(HAS_VOICE))
                }
            },
            Step::VoiceRecord => {
                if let Some((MediaKind::Voice, media)) = event.payload().as_media() {
                    draft.as_recipe_mut()?.voice = Some(media.clone());
                }
                say(event, Reply::text(text::PROMPT_PHOTO)).await?;
                Ok(Transition::To(PHOTO))
            }
            Step::Photo => {
                if let Some((MediaKind::Photo, media)) = event.payload().as_media() {
                    draft.as_recipe_mut()?.photo = Some(media.clone());
                }
                self.commit(event, draft).await
            }
        }
    }
}

/// Builds the recipe-creation flow.
#[must_use]
pub fn flow(store: Arc<dyn RecordStore>) -> Flow<Draft> {
    let handler = |step| {
        Arc::new(CreateHandler {
            store: store.clone(),
            step,
        }) as Arc<dyn StateHandler<Draft>>
    };

    Flow::new("recipe_create")
        .with_entry_point(
            TriggerPattern::Command("add_recipe"),
            require_auth(store.clone(), handler(Step::Start)),
        )
        .with_state(TITLE, TriggerPattern::Text, handler(Step::Title))
        .with_state(INGREDIENTS, TriggerPattern::Text, handler(Step::Ingredients))
        .with_state(COOKING_TIME, TriggerPattern::Text, handler(Step::CookingTime))
        .with_state(SKILL_LEVEL, TriggerPattern::Text, handler(Step::SkillLevel))
        .with_state(CALORIES, TriggerPattern::Text, handler(Step::Calories))
        .with_state(INSTRUCTIONS, TriggerPattern::Text, handler(Step::Instructions))
        .with_state(HAS_VOICE, TriggerPattern::Text, handler(Step::HasVoice))
        .with_state(
            VOICE_RECORD,
            TriggerPattern::Media(MediaKind::Voice),
            handler(Step::VoiceRecord),
        )
        .with_state(
            PHOTO,
            TriggerPattern::Media(MediaKind::Photo),
            handler(Step::Photo),
        )
        .with_state(PHOTO, TriggerPattern::Command("skip"), handler(Step::Photo))
        .with_fallback(TriggerPattern::Command("cancel"), cancel_handler())
}
