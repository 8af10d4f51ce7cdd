//! Shared handler plumbing: the cancel fallback and small conversions
//! used by every flow.

use crate::draft::Draft;
use crate::text;
use async_trait::async_trait;
use saffron_dialogue::{Event, HandlerError, Reply, StateHandler, Transition};
use saffron_store::StoreError;
use std::sync::Arc;

/// Sends a reply, converting delivery failure into an internal handler
/// error.
pub(crate) async fn say(event: &Event, reply: Reply) -> Result<(), HandlerError> {
    event.reply(reply).await.map_err(|err| HandlerError::Internal {
        reason: err.to_string(),
    })
}

/// Maps a record-store failure to the persistence handler error.
pub(crate) fn persistence(err: StoreError) -> HandlerError {
    HandlerError::Persistence {
        reason: err.to_string(),
    }
}

/// Returns the event's free text; the flow's trigger patterns guarantee
/// it is present, so absence is an internal error.
pub(crate) fn require_text(event: &Event) -> Result<&str, HandlerError> {
    event
        .payload()
        .as_text()
        .ok_or_else(|| HandlerError::Internal {
            reason: "text handler invoked without a text payload".to_string(),
        })
}

/// Returns the event's callback token; same contract as [`require_text`].
pub(crate) fn require_callback(event: &Event) -> Result<&str, HandlerError> {
    event
        .payload()
        .as_callback()
        .ok_or_else(|| HandlerError::Internal {
            reason: "callback handler invoked without a callback payload".to_string(),
        })
}

struct CancelHandler;

#[async_trait]
impl StateHandler<Draft> for CancelHandler {
    async fn handle(&self, event: &Event, _draft: &mut Draft) -> Result<Transition, HandlerError> {
        say(event, Reply::text(text::CANCELLED)).await?;
        Ok(Transition::End)
    }
}

/// The shared `/cancel` fallback: reply and end the session.
pub(crate) fn cancel_handler() -> Arc<dyn StateHandler<Draft>> {
    Arc::new(CancelHandler)
}
