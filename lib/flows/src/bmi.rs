//! BMI flow: `/calculate_bmi` → height → weight → verdict.
//!
//! Both numeric states re-prompt in place on bad input. The weight state
//! computes the index, persists it as the actor's metric, and classifies
//! it into one of three bands.

use crate::draft::{BmiDraft, Draft};
use crate::support::{cancel_handler, persistence, require_text, say};
use crate::text;
use async_trait::async_trait;
use saffron_access::require_auth;
use saffron_dialogue::{
    Event, Flow, HandlerError, Reply, StateHandler, StateId, Transition, TriggerPattern,
};
use saffron_store::RecordStore;
use std::sync::Arc;

pub const HEIGHT: StateId = StateId::new("bmi_height");
pub const WEIGHT: StateId = StateId::new("bmi_weight");

/// Band boundaries, in BMI units.
const UNDERWEIGHT_BELOW: f64 = 18.5;
const BALANCED_BELOW: f64 = 25.0;

fn band_reply(bmi: f64) -> &'static str {
    if bmi < UNDERWEIGHT_BELOW {
        text::BMI_UNDERWEIGHT
    } else if bmi < BALANCED_BELOW {
        text::BMI_BALANCED
    } else {
        text::BMI_OVERWEIGHT
    }
}

#[derive(Clone, Copy)]
enum Step {
    Start,
    Height,
    Weight,
}

struct BmiHandler {
    store: Arc<dyn RecordStore>,
    step: Step,
}

fn parse_positive(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

#[async_trait]
impl StateHandler<Draft> for BmiHandler {
    async fn handle(&self, event: &Event, draft: &mut Draft) -> Result<Transition, HandlerError> {
        match self.step {
            Step::Start => {
                *draft = Draft::Bmi(BmiDraft::default());
                say(event, Reply::text(text::PROMPT_HEIGHT)).await?;
                Ok(Transition::To(HEIGHT))
            }
            Step::Height => {
                let Some(height) = parse_positive(require_text(event)?) else {
                    say(event, Reply::text(text::INVALID_NUMBER)).await?;
                    return Ok(Transition::To(HEIGHT));
                };
                draft.as_bmi_mut()?.height_cm = Some(height);
                say(event, Reply::text(text::PROMPT_WEIGHT)).await?;
                Ok(Transition::To(WEIGHT))
            }
            Step::Weight => {
                let Some(weight) = parse_positive(require_text(event)?) else {
                    say(event, Reply::text(text::INVALID_NUMBER)).await?;
                    return Ok(Transition::To(WEIGHT));
                };
                let height_cm =
                    draft
                        .as_bmi_mut()?
                        .height_cm
                        .ok_or_else(|| HandlerError::Internal {
                            reason: "weight state reached without a height".to_string(),
                        })?;

                let height_m = height_cm / 100.0;
                let bmi = weight / (height_m * height_m);
                self.store
                    .save_metric(event.actor(), bmi)
                    .await
                    .map_err(persistence)?;

                say(
                    event,
                    Reply::text(format!("Your BMI is {bmi:.1}.\n\n{}", band_reply(bmi))),
                )
                .await?;
                Ok(Transition::End)
            }
        }
    }
}

/// Builds the BMI flow.
#[must_use]
pub fn flow(store: Arc<dyn RecordStore>) -> Flow<Draft> {
    let handler = |step| {
        Arc::new(BmiHandler {
            store: store.clone(),
            step,
        }) as Arc<dyn StateHandler<Draft>>
    };

    Flow::new("bmi")
        .with_entry_point(
            TriggerPattern::Command("calculate_bmi"),
            require_auth(store.clone(), handler(Step::Start)),
        )
        .with_state(HEIGHT, TriggerPattern::Text, handler(Step::Height))
        .with_state(WEIGHT, TriggerPattern::Text, handler(Step::Weight))
        .with_fallback(TriggerPattern::Command("cancel"), cancel_handler())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{cmd, engine_with_all, event, register_actor, txt, RecordingSink, CHAT};
    use saffron_core::ChatId;
    use saffron_dialogue::{ConversationId, FlowName};
    use saffron_store::MemoryStore;

    #[test]
    fn bands_split_at_the_documented_boundaries() {
        assert_eq!(band_reply(18.4), text::BMI_UNDERWEIGHT);
        assert_eq!(band_reply(18.5), text::BMI_BALANCED);
        assert_eq!(band_reply(24.9), text::BMI_BALANCED);
        assert_eq!(band_reply(25.0), text::BMI_OVERWEIGHT);
    }

    #[tokio::test]
    async fn computes_persists_and_classifies() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with_all(store.clone());
        let sink = Arc::new(RecordingSink::default());
        register_actor(store.as_ref()).await;

        for payload in [cmd("calculate_bmi"), txt("180"), txt("72")] {
            assert!(engine.dispatch(event(payload, &sink)).await.is_handled());
        }

        // 72 / 1.8^2 = 22.2, the balanced band.
        assert!(sink.contains_text("22.2"));
        assert!(sink.contains_text(text::BMI_BALANCED));
        assert_eq!(engine.active_sessions(), 0);
    }

    #[tokio::test]
    async fn bad_height_reprompts_without_advancing() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with_all(store.clone());
        let sink = Arc::new(RecordingSink::default());
        register_actor(store.as_ref()).await;

        engine.dispatch(event(cmd("calculate_bmi"), &sink)).await;
        engine.dispatch(event(txt("tall"), &sink)).await;

        assert_eq!(sink.last_text().as_deref(), Some(text::INVALID_NUMBER));
        let info = engine
            .session_info(
                &FlowName::new("bmi"),
                ConversationId::per_chat(ChatId::new(CHAT)),
            )
            .expect("session alive");
        assert_eq!(info.state, Some(HEIGHT));
    }

    #[tokio::test]
    async fn zero_height_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with_all(store.clone());
        let sink = Arc::new(RecordingSink::default());
        register_actor(store.as_ref()).await;

        engine.dispatch(event(cmd("calculate_bmi"), &sink)).await;
        engine.dispatch(event(txt("0"), &sink)).await;

        assert_eq!(sink.last_text().as_deref(), Some(text::INVALID_NUMBER));
    }
}
