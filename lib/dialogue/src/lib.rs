//! Conversation state-machine engine for the saffron platform.
//!
//! This crate provides the dialogue core:
//!
//! - **Events and Replies**: the abstract transport contract
//! - **Trigger Patterns**: command, callback-prefix, text and media dispatch
//! - **Flows**: immutable, declarative conversation templates
//! - **Sessions**: live per-conversation flow instances with draft data
//! - **Engine**: event routing, transitions, fallbacks and re-entry
//!
//! The engine is generic over the draft type `D` so that applications can
//! supply their own tagged union of per-flow draft records.

pub mod engine;
pub mod error;
pub mod event;
pub mod flow;
pub mod handler;
pub mod pattern;
pub mod reply;
pub mod session;
pub mod store;

pub use engine::{DispatchOutcome, Engine};
pub use error::EngineError;
pub use event::{Event, MediaKind, MediaRef, Payload};
pub use flow::{Flow, FlowName, Scoping};
pub use handler::{HandlerError, StateHandler, StateId, Transition};
pub use pattern::TriggerPattern;
pub use reply::{ButtonAction, Keyboard, KeyboardButton, MediaAttachment, Reply, ReplySink, SinkError};
pub use session::{ConversationId, Session};
pub use store::{SessionInfo, SessionKey, SessionStore};
