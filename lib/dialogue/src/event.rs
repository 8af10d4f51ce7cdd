//! Inbound events delivered by the chat transport.
//!
//! An [`Event`] is the engine's only input: it carries the conversation
//! coordinates (chat and actor), a trigger payload, and the reply sink
//! bound to the originating message. The engine never talks to the
//! transport directly.

use crate::reply::{Reply, ReplySink, SinkError};
use saffron_core::{ActorId, ChatId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use saffron_core::{MediaKind, MediaRef};

/// The trigger payload carried by an inbound event.
///
/// Free text is a distinct variant: text trigger patterns only match when
/// the event carries no command or callback token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// A slash-command token, e.g. `/start`, with any trailing arguments.
    Command { name: String, args: Vec<String> },
    /// A structured callback token, e.g. from a keyboard button press.
    Callback { token: String },
    /// Free text.
    Text { text: String },
    /// A media marker.
    Media {
        #[serde(rename = "media_kind")]
        kind: MediaKind,
        media: MediaRef,
    },
}

impl Payload {
    /// Creates a command payload.
    #[must_use]
    pub fn command(name: impl Into<String>, args: Vec<String>) -> Self {
        Self::Command {
            name: name.into(),
            args,
        }
    }

    /// Creates a callback payload.
    #[must_use]
    pub fn callback(token: impl Into<String>) -> Self {
        Self::Callback {
            token: token.into(),
        }
    }

    /// Creates a free-text payload.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a media payload.
    #[must_use]
    pub fn media(kind: MediaKind, media: MediaRef) -> Self {
        Self::Media { kind, media }
    }

    /// Returns the free text, if this payload is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Returns the callback token, if this payload is a callback.
    #[must_use]
    pub fn as_callback(&self) -> Option<&str> {
        match self {
            Self::Callback { token } => Some(token),
            _ => None,
        }
    }

    /// Returns the media reference, if this payload is media.
    #[must_use]
    pub fn as_media(&self) -> Option<(&MediaKind, &MediaRef)> {
        match self {
            Self::Media { kind, media } => Some((kind, media)),
            _ => None,
        }
    }
}

/// An inbound event: conversation coordinates, a trigger payload, and the
/// reply sink bound to the originating message.
#[derive(Clone)]
pub struct Event {
    chat: ChatId,
    actor: ActorId,
    actor_name: Option<String>,
    payload: Payload,
    sink: Arc<dyn ReplySink>,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub fn new(chat: ChatId, actor: ActorId, payload: Payload, sink: Arc<dyn ReplySink>) -> Self {
        Self {
            chat,
            actor,
            actor_name: None,
            payload,
            sink,
        }
    }

    /// Sets the actor's display name as reported by the transport.
    #[must_use]
    pub fn with_actor_name(mut self, name: impl Into<String>) -> Self {
        self.actor_name = Some(name.into());
        self
    }

    /// Returns the chat this event belongs to.
    #[must_use]
    pub fn chat(&self) -> ChatId {
        self.chat
    }

    /// Returns the actor who produced this event.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Returns the actor's display name, if the transport reported one.
    #[must_use]
    pub fn actor_name(&self) -> Option<&str> {
        self.actor_name.as_deref()
    }

    /// Returns the trigger payload.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the reply sink bound to this event.
    #[must_use]
    pub fn sink(&self) -> &dyn ReplySink {
        self.sink.as_ref()
    }

    /// Sends a reply through the bound sink.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the transport rejects the reply.
    pub async fn reply(&self, reply: Reply) -> Result<(), SinkError> {
        self.sink.send(reply).await
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("chat", &self.chat)
            .field("actor", &self.actor)
            .field("actor_name", &self.actor_name)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}
