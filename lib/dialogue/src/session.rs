//! Live conversation sessions.
//!
//! A session binds one flow to one conversation: the current state plus
//! the draft data accumulated turn by turn. Sessions are owned exclusively
//! by the engine, live in memory only, and die with the process unless a
//! handler ends them first.

use crate::event::Event;
use crate::flow::{FlowName, Scoping};
use crate::handler::StateId;
use chrono::{DateTime, Utc};
use saffron_core::{ActorId, ChatId};
use std::fmt;

/// The key identifying one ongoing dialogue instance.
///
/// Resolved from an event per the owning flow's scoping rule: per-chat
/// flows key on the chat alone, per-message flows on chat and actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationId {
    chat: ChatId,
    actor: Option<ActorId>,
}

impl ConversationId {
    /// Creates a chat-scoped conversation id.
    #[must_use]
    pub fn per_chat(chat: ChatId) -> Self {
        Self { chat, actor: None }
    }

    /// Creates a (chat, actor)-scoped conversation id.
    #[must_use]
    pub fn per_message(chat: ChatId, actor: ActorId) -> Self {
        Self {
            chat,
            actor: Some(actor),
        }
    }

    /// Resolves the conversation id for an event under a scoping rule.
    #[must_use]
    pub fn resolve(scoping: Scoping, event: &Event) -> Self {
        match scoping {
            Scoping::PerChat => Self::per_chat(event.chat()),
            Scoping::PerMessage => Self::per_message(event.chat(), event.actor()),
        }
    }

    /// Returns the chat component.
    #[must_use]
    pub fn chat(&self) -> ChatId {
        self.chat
    }

    /// Returns the actor component, if scoped per message.
    #[must_use]
    pub fn actor(&self) -> Option<ActorId> {
        self.actor
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.actor {
            Some(actor) => write!(f, "chat:{}/actor:{}", self.chat, actor),
            None => write!(f, "chat:{}", self.chat),
        }
    }
}

/// A live instance of a flow bound to one conversation.
///
/// `current_state` is `None` only while the session sits in the ENTRY
/// pseudo-state, between creation and the entry handler's transition.
#[derive(Debug)]
pub struct Session<D> {
    conversation_id: ConversationId,
    flow_name: FlowName,
    current_state: Option<StateId>,
    draft: D,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl<D: Default> Session<D> {
    /// Creates a fresh session in the ENTRY pseudo-state with an empty
    /// draft.
    #[must_use]
    pub fn new(conversation_id: ConversationId, flow_name: FlowName) -> Self {
        let now = Utc::now();
        Self {
            conversation_id,
            flow_name,
            current_state: None,
            draft: D::default(),
            created_at: now,
            last_active_at: now,
        }
    }
}

impl<D> Session<D> {
    /// Returns the conversation this session belongs to.
    #[must_use]
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Returns the owning flow's name.
    #[must_use]
    pub fn flow_name(&self) -> &FlowName {
        &self.flow_name
    }

    /// Returns the current state, or `None` for the ENTRY pseudo-state.
    #[must_use]
    pub fn current_state(&self) -> Option<StateId> {
        self.current_state
    }

    /// Returns the accumulated draft.
    #[must_use]
    pub fn draft(&self) -> &D {
        &self.draft
    }

    /// Returns mutable access to the draft.
    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session last handled an event.
    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    pub(crate) fn set_state(&mut self, state: StateId) {
        self.current_state = Some(state);
    }

    pub(crate) fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }
}
