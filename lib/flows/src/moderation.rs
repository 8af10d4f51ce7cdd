//! Moderation flow, admin-gated.
//!
//! `/ban_user <id>` collects a reason in a one-state sub-conversation
//! before banning and notifying the target; `/ban_now <id>` is the
//! degenerate case that bans immediately at entry. The notification is
//! best effort: a target who blocked the assistant is banned all the
//! same.

use crate::draft::{BanDraft, Draft};
use crate::support::{cancel_handler, persistence, require_text, say};
use crate::text;
use async_trait::async_trait;
use saffron_access::admin_only;
use saffron_core::ActorId;
use saffron_dialogue::{
    Event, Flow, HandlerError, Payload, Reply, StateHandler, StateId, Transition, TriggerPattern,
};
use saffron_store::RecordStore;
use std::sync::Arc;
use tracing::warn;

pub const BAN_REASON: StateId = StateId::new("ban_reason");

#[derive(Clone, Copy)]
enum Step {
    /// `/ban_user <id>`: capture the target, ask for a reason.
    Start,
    /// `/ban_now <id>`: ban at entry, no state entered.
    Immediate,
    /// The reason text: ban, notify, confirm.
    Reason,
}

struct ModerationHandler {
    store: Arc<dyn RecordStore>,
    step: Step,
}

fn target_from_args(event: &Event) -> Option<ActorId> {
    match event.payload() {
        Payload::Command { args, .. } => args.first()?.parse().ok(),
        _ => None,
    }
}

impl ModerationHandler {
    async fn ban(
        &self,
        event: &Event,
        target: ActorId,
        reason: Option<&str>,
    ) -> Result<Transition, HandlerError> {
        let known = self
            .store
            .set_banned(target, true)
            .await
            .map_err(persistence)?;
        if !known {
            say(event, Reply::text(text::BAN_UNKNOWN_USER)).await?;
            return Ok(Transition::End);
        }

        // Best-effort notification; failure only gets a log line.
        let notice = match reason {
            Some(reason) => format!("{}\nReason: {reason}", text::BAN_NOTICE),
            None => text::BAN_NOTICE.to_string(),
        };
        if let Err(err) = event.sink().notify(target, Reply::text(notice)).await {
            warn!(target = %target, error = %err, "could not notify banned actor");
        }

        say(event, Reply::text(text::BAN_DONE)).await?;
        Ok(Transition::End)
    }
}

#[async_trait]
impl StateHandler<Draft> for ModerationHandler {
    async fn handle(&self, event: &Event, draft: &mut Draft) -> Result<Transition, HandlerError> {
        match self.step {
            Step::Start => {
                let Some(target) = target_from_args(event) else {
                    say(event, Reply::text(text::BAN_USAGE)).await?;
                    return Ok(Transition::End);
                };
                *draft = Draft::Ban(BanDraft { target });
                say(event, Reply::text(text::BAN_REASON_PROMPT)).await?;
                Ok(Transition::To(BAN_REASON))
            }
            Step::Immediate => {
                let Some(target) = target_from_args(event) else {
                    say(event, Reply::text(text::BAN_USAGE)).await?;
                    return Ok(Transition::End);
                };
                self.ban(event, target, None).await
            }
            Step::Reason => {
                let reason = require_text(event)?.trim().to_string();
                let target = draft.as_ban_mut()?.target;
                self.ban(event, target, Some(&reason)).await
            }
        }
    }
}

/// Builds the moderation flow.
#[must_use]
pub fn flow(store: Arc<dyn RecordStore>) -> Flow<Draft> {
    let handler = |step| {
        Arc::new(ModerationHandler {
            store: store.clone(),
            step,
        }) as Arc<dyn StateHandler<Draft>>
    };

    Flow::new("moderation")
        .with_entry_point(
            TriggerPattern::Command("ban_user"),
            admin_only(store.clone(), handler(Step::Start)),
        )
        .with_entry_point(
            TriggerPattern::Command("ban_now"),
            admin_only(store.clone(), handler(Step::Immediate)),
        )
        .with_state(BAN_REASON, TriggerPattern::Text, handler(Step::Reason))
        .with_fallback(TriggerPattern::Command("cancel"), cancel_handler())
}
