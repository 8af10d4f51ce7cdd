//! State identifiers, transitions, and the handler contract.

use crate::event::Event;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// An opaque state token, unique within a flow.
///
/// Flows declare their states as consts; there is no ordering guarantee
/// across flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StateId(&'static str);

impl StateId {
    /// Creates a state identifier from a static token.
    #[must_use]
    pub const fn new(token: &'static str) -> Self {
        Self(token)
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The outcome a handler reports back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move the session to the given state.
    To(StateId),
    /// The terminal marker: the session is deleted.
    End,
}

/// Errors a handler can surface to the engine.
///
/// Validation failures are not errors: handlers recover from them locally
/// by re-prompting and returning their own state. Everything here (except
/// [`HandlerError::Abort`]) produces a user-visible reply from the engine
/// and terminates the session; the engine never retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler already replied and wants the session gone quietly.
    Abort,
    /// A referenced entity does not exist.
    NotFound { what: String },
    /// The actor is not allowed to perform the operation.
    Permission,
    /// A record-store write failed; nothing was committed.
    Persistence { reason: String },
    /// The session draft did not have the shape the handler expected.
    Internal { reason: String },
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "handler aborted"),
            Self::NotFound { what } => write!(f, "not found: {what}"),
            Self::Permission => write!(f, "permission denied"),
            Self::Persistence { reason } => write!(f, "persistence failed: {reason}"),
            Self::Internal { reason } => write!(f, "internal handler error: {reason}"),
        }
    }
}

impl std::error::Error for HandlerError {}

/// Trait for per-state (and entry/fallback) handlers.
///
/// A handler receives the triggering event and mutable access to the
/// session's draft, sends any replies through the event's sink, and
/// reports the transition to apply.
#[async_trait]
pub trait StateHandler<D: Send>: Send + Sync {
    /// Handles one event for one session.
    ///
    /// # Errors
    ///
    /// See [`HandlerError`] for the engine's reaction to each variant.
    async fn handle(&self, event: &Event, draft: &mut D) -> Result<Transition, HandlerError>;
}
