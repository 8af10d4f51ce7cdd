//! Error types for record-store operations.

use std::fmt;

/// Errors from record-store operations.
///
/// Business outcomes (owner mismatch, entity missing, unknown actor) are
/// expressed in method return values, not errors; this type covers the
/// store itself failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not serve the request.
    Unavailable { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "record store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}
