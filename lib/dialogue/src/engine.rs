//! The dialogue engine: flow registration and event dispatch.
//!
//! Dispatch runs in two passes. First, every flow with an active session
//! for the event's conversation gets a chance to consume it — via the
//! current state's handler table, then the flow's fallbacks. If no active
//! session consumes the event, entry points are tried in registration
//! order. Exactly one handler executes per dispatch; events nothing
//! matches are dropped without a reply.

use crate::error::EngineError;
use crate::event::Event;
use crate::flow::{Flow, FlowName};
use crate::handler::{HandlerError, StateHandler, Transition};
use crate::reply::Reply;
use crate::session::{ConversationId, Session};
use crate::store::{SessionInfo, SessionKey, SessionStore, Slot};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const NOT_FOUND_REPLY: &str = "Sorry, I couldn't find what you were looking for.";
const PERMISSION_REPLY: &str = "You don't have permission to do that.";
const PERSISTENCE_REPLY: &str = "Something went wrong while saving. Please try again.";
const INTERNAL_REPLY: &str = "Something went wrong. Please start over.";

/// What `dispatch` did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler of the named flow consumed the event.
    Handled { flow: FlowName },
    /// Nothing matched; the event was dropped without a reply.
    Dropped,
}

impl DispatchOutcome {
    /// Returns true if a handler consumed the event.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// The dialogue engine.
///
/// Holds the registered flows and the session store. Registration happens
/// up front on `&mut self`; dispatch takes `&self` so the engine can be
/// shared behind an `Arc` and driven concurrently.
pub struct Engine<D: Send> {
    flows: Vec<Flow<D>>,
    sessions: SessionStore<D>,
}

impl<D: Default + Send + 'static> Engine<D> {
    /// Creates an engine with no flows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flows: Vec::new(),
            sessions: SessionStore::new(),
        }
    }

    /// Registers a flow.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateFlowName`] if a flow with the same
    /// name is already registered, or [`EngineError::InvalidFlow`] if the
    /// definition fails validation.
    pub fn register(&mut self, flow: Flow<D>) -> Result<(), EngineError> {
        flow.validate()?;
        if self.flows.iter().any(|existing| existing.name() == flow.name()) {
            return Err(EngineError::DuplicateFlowName {
                name: flow.name().clone(),
            });
        }
        info!(flow = %flow.name(), states = flow.states().len(), "registered flow");
        self.flows.push(flow);
        Ok(())
    }

    /// Routes one inbound event.
    ///
    /// Two events for the same conversation are serialized against the
    /// same session; distinct conversations proceed concurrently.
    pub async fn dispatch(&self, event: Event) -> DispatchOutcome {
        // Pass 1: flows with an active session for this conversation.
        for flow in &self.flows {
            let key = SessionKey::new(
                flow.name().clone(),
                ConversationId::resolve(flow.scoping(), &event),
            );
            let Some(slot) = self.sessions.existing_slot(&key) else {
                continue;
            };
            let mut guard = slot.lock().await;

            let current = match guard.session.as_ref() {
                Some(session) => session.current_state(),
                None => continue,
            };
            let handler = current
                .and_then(|state| flow.state_handler(state, event.payload()))
                .or_else(|| flow.fallback_handler(event.payload()))
                .cloned();
            let Some(handler) = handler else {
                debug!(flow = %flow.name(), "event fell through active session");
                continue;
            };

            debug!(flow = %flow.name(), state = ?current.map(|s| s.as_str()), "routing to active session");
            self.run(flow, &handler, &event, &mut guard).await;
            drop(guard);
            drop(slot);
            self.sessions.prune(&key);
            return DispatchOutcome::Handled {
                flow: flow.name().clone(),
            };
        }

        // Pass 2: entry points, in registration order.
        for flow in &self.flows {
            let Some(handler) = flow.entry_handler(event.payload()).cloned() else {
                continue;
            };
            let conversation = ConversationId::resolve(flow.scoping(), &event);
            let key = SessionKey::new(flow.name().clone(), conversation);
            let slot = self.sessions.slot(&key);
            let mut guard = slot.lock().await;

            if guard.session.is_some() {
                if !flow.allow_reentry() {
                    debug!(flow = %flow.name(), "entry match ignored, session already active");
                    continue;
                }
                debug!(flow = %flow.name(), "re-entry, replacing active session");
            }
            guard.session = Some(Session::new(conversation, flow.name().clone()));

            debug!(flow = %flow.name(), conversation = %conversation, "entry point matched");
            self.run(flow, &handler, &event, &mut guard).await;
            drop(guard);
            drop(slot);
            self.sessions.prune(&key);
            return DispatchOutcome::Handled {
                flow: flow.name().clone(),
            };
        }

        debug!(chat = %event.chat(), "event matched no flow, dropped");
        DispatchOutcome::Dropped
    }

    /// Runs a handler against the session in `slot` and applies the
    /// resulting transition.
    async fn run(
        &self,
        flow: &Flow<D>,
        handler: &Arc<dyn StateHandler<D>>,
        event: &Event,
        slot: &mut Slot<D>,
    ) {
        let result = {
            let Some(session) = slot.session.as_mut() else {
                return;
            };
            session.touch();
            handler.handle(event, session.draft_mut()).await
        };

        match result {
            Ok(Transition::To(state)) => {
                if flow.declares(state) {
                    if let Some(session) = slot.session.as_mut() {
                        session.set_state(state);
                    }
                } else {
                    // A transition out of the declared state set would break
                    // routing for every later event; end the session instead.
                    error!(flow = %flow.name(), state = %state, "handler returned undeclared state, ending session");
                    slot.session = None;
                }
            }
            Ok(Transition::End) => {
                slot.session = None;
            }
            Err(HandlerError::Abort) => {
                slot.session = None;
            }
            Err(err) => {
                warn!(flow = %flow.name(), error = %err, "handler failed, ending session");
                if let Err(send_err) = event.reply(Reply::text(Self::error_reply(&err))).await {
                    warn!(error = %send_err, "failed to deliver error reply");
                }
                slot.session = None;
            }
        }
    }

    fn error_reply(err: &HandlerError) -> &'static str {
        match err {
            HandlerError::NotFound { .. } => NOT_FOUND_REPLY,
            HandlerError::Permission => PERMISSION_REPLY,
            HandlerError::Persistence { .. } => PERSISTENCE_REPLY,
            HandlerError::Abort | HandlerError::Internal { .. } => INTERNAL_REPLY,
        }
    }

    /// Returns a snapshot of the session a flow holds for a conversation.
    #[must_use]
    pub fn session_info(
        &self,
        flow: &FlowName,
        conversation: ConversationId,
    ) -> Option<SessionInfo> {
        self.sessions
            .snapshot(&SessionKey::new(flow.clone(), conversation))
    }

    /// Returns the number of live sessions across all flows.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.active_sessions()
    }

    /// Removes sessions idle longer than `max_age`; see
    /// [`SessionStore::sweep_idle`].
    pub fn sweep_idle(&self, max_age: chrono::Duration) -> usize {
        let removed = self.sessions.sweep_idle(max_age);
        if removed > 0 {
            info!(removed, "swept idle sessions");
        }
        removed
    }
}

impl<D: Default + Send + 'static> Default for Engine<D> {
    fn default() -> Self {
        Self::new()
    }
}
