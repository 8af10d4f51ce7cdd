//! Registration flow: `/start` → username capture → commit.
//!
//! Already-registered actors short-circuit straight to terminal with a
//! welcome reply and the main menu; nobody enters the username state
//! twice.

use crate::draft::{Draft, RegistrationDraft};
use crate::render;
use crate::support::{cancel_handler, persistence, require_text, say};
use crate::text;
use async_trait::async_trait;
use saffron_dialogue::{
    Event, Flow, HandlerError, Reply, StateHandler, StateId, Transition, TriggerPattern,
};
use saffron_store::RecordStore;
use std::sync::Arc;

/// The single registration state: waiting for a username.
pub const ASK_USERNAME: StateId = StateId::new("register_username");

enum Step {
    Start,
    Username,
}

struct RegistrationHandler {
    store: Arc<dyn RecordStore>,
    step: Step,
}

impl RegistrationHandler {
    fn welcome(&self, name: &str) -> Reply {
        Reply::text(format!("{} {name} 👋\n\n{}", text::WELCOME_BACK, text::MENU_HINT))
            .with_keyboard(render::main_menu())
    }
}

#[async_trait]
impl StateHandler<Draft> for RegistrationHandler {
    async fn handle(&self, event: &Event, draft: &mut Draft) -> Result<Transition, HandlerError> {
        match self.step {
            Step::Start => {
                let registered = self
                    .store
                    .is_registered(event.actor())
                    .await
                    .map_err(persistence)?;
                if registered {
                    let name = event.actor_name().unwrap_or("there");
                    say(event, self.welcome(name)).await?;
                    return Ok(Transition::End);
                }

                *draft = Draft::Registration(RegistrationDraft {
                    display_name: event.actor_name().map(str::to_string),
                });
                say(event, Reply::text(text::REGISTER_INTRO)).await?;
                Ok(Transition::To(ASK_USERNAME))
            }
            Step::Username => {
                let username = require_text(event)?.trim().to_string();
                if username.is_empty() {
                    say(event, Reply::text(text::REGISTER_INTRO)).await?;
                    return Ok(Transition::To(ASK_USERNAME));
                }

                let display_name = draft
                    .as_registration_mut()?
                    .display_name
                    .clone()
                    .unwrap_or_default();
                self.store
                    .register(event.actor(), &display_name, &username)
                    .await
                    .map_err(persistence)?;

                let name = if display_name.is_empty() {
                    username.clone()
                } else {
                    display_name
                };
                say(
                    event,
                    Reply::text(format!(
                        "{}!\n{} {name} 👋\n\n{}",
                        text::REGISTER_DONE,
                        text::WELCOME_BACK,
                        text::MENU_HINT
                    ))
                    .with_keyboard(render::main_menu()),
                )
                .await?;
                Ok(Transition::End)
            }
        }
    }
}

/// Builds the registration flow.
#[must_use]
pub fn flow(store: Arc<dyn RecordStore>) -> Flow<Draft> {
    let handler = |step| {
        Arc::new(RegistrationHandler {
            store: store.clone(),
            step,
        }) as Arc<dyn StateHandler<Draft>>
    };

    Flow::new("registration")
        .with_entry_point(TriggerPattern::Command("start"), handler(Step::Start))
        .with_state(ASK_USERNAME, TriggerPattern::Text, handler(Step::Username))
        .with_fallback(TriggerPattern::Command("cancel"), cancel_handler())
}
