//! Error types for the dialogue engine.

use crate::flow::FlowName;
use std::fmt;

/// Errors from flow registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A flow with the same name is already registered.
    DuplicateFlowName { name: FlowName },
    /// The flow definition failed validation.
    InvalidFlow { name: FlowName, reason: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFlowName { name } => {
                write!(f, "duplicate flow name: {name}")
            }
            Self::InvalidFlow { name, reason } => {
                write!(f, "invalid flow '{name}': {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
