//! Trigger patterns for event dispatch.
//!
//! Patterns decide whether a handler is interested in an event. The engine
//! does only this coarse dispatch; parsing structured callback tokens
//! beyond their prefix is the handler's job.

use crate::event::{MediaKind, Payload};

/// A trigger pattern attached to an entry point, state, or fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPattern {
    /// A literal slash-command token, matched by name (without the slash).
    Command(&'static str),
    /// A structured callback token, matched by prefix.
    CallbackPrefix(&'static str),
    /// Free text. Matches only when the event carries no command or
    /// callback token.
    Text,
    /// A media marker of the given kind.
    Media(MediaKind),
}

impl TriggerPattern {
    /// Returns true if this pattern matches the payload.
    #[must_use]
    pub fn matches(&self, payload: &Payload) -> bool {
        match (self, payload) {
            (Self::Command(name), Payload::Command { name: got, .. }) => got == name,
            (Self::CallbackPrefix(prefix), Payload::Callback { token }) => {
                token.starts_with(prefix)
            }
            (Self::Text, Payload::Text { .. }) => true,
            (Self::Media(kind), Payload::Media { kind: got, .. }) => got == kind,
            _ => false,
        }
    }
}
