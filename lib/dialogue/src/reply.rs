//! Outbound replies and the sink that delivers them.
//!
//! A [`Reply`] is the engine's only output: optional text, an optional
//! media attachment, and an optional keyboard. Delivery goes through a
//! [`ReplySink`] bound to the inbound event, so the engine never holds a
//! transport connection of its own.

use crate::event::{MediaKind, MediaRef};
use async_trait::async_trait;
use saffron_core::ActorId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A media attachment on an outbound reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// The kind of media.
    pub kind: MediaKind,
    /// The transport reference to the media.
    pub media: MediaRef,
}

/// The action a keyboard button triggers when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ButtonAction {
    /// Sends a structured callback token back to the engine.
    Callback { token: String },
    /// Suggests literal input text (a reply-keyboard shortcut).
    Input { text: String },
}

/// A single keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    /// The label shown to the user.
    pub label: String,
    /// What pressing the button produces.
    pub action: ButtonAction,
}

impl KeyboardButton {
    /// Creates a button that sends a callback token.
    #[must_use]
    pub fn callback(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback {
                token: token.into(),
            },
        }
    }

    /// Creates a button that suggests literal input text; the label doubles
    /// as the suggestion.
    #[must_use]
    pub fn input(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            action: ButtonAction::Input {
                text: label.clone(),
            },
            label,
        }
    }
}

/// A keyboard: rows of buttons attached to a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    rows: Vec<Vec<KeyboardButton>>,
}

impl Keyboard {
    /// Creates an empty keyboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row of buttons.
    #[must_use]
    pub fn with_row(mut self, row: Vec<KeyboardButton>) -> Self {
        self.rows.push(row);
        self
    }

    /// Returns the rows of buttons.
    #[must_use]
    pub fn rows(&self) -> &[Vec<KeyboardButton>] {
        &self.rows
    }

    /// Returns true if the keyboard has no buttons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

/// An outbound reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Reply text, if any.
    pub text: Option<String>,
    /// Media attachment, if any.
    pub media: Option<MediaAttachment>,
    /// Keyboard, if any.
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    /// Creates a text-only reply.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Creates a media-only reply.
    #[must_use]
    pub fn media(kind: MediaKind, media: MediaRef) -> Self {
        Self {
            media: Some(MediaAttachment { kind, media }),
            ..Self::default()
        }
    }

    /// Attaches a keyboard.
    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Errors from reply delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The transport channel is gone.
    Closed { reason: String },
    /// A referenced media object could not be read.
    MediaUnavailable { media: MediaRef },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed { reason } => write!(f, "reply sink closed: {reason}"),
            Self::MediaUnavailable { media } => {
                write!(f, "media unavailable: {media}")
            }
        }
    }
}

impl std::error::Error for SinkError {}

/// Trait for reply delivery, implemented by the transport layer.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Sends a reply into the conversation the triggering event came from.
    async fn send(&self, reply: Reply) -> Result<(), SinkError>;

    /// Sends a reply to another actor, out of band.
    ///
    /// Used for best-effort notifications (e.g. telling an actor they were
    /// banned); callers are expected to tolerate failure.
    async fn notify(&self, actor: ActorId, reply: Reply) -> Result<(), SinkError>;
}
