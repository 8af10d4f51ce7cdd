//! Access gates for the saffron platform.
//!
//! Handler combinators that check an actor's standing in the record store
//! before a wrapped handler runs: [`require_auth`] for registration,
//! [`admin_only`] for the privileged allow-list.

pub mod gate;

pub use gate::{admin_only, require_auth, NOT_ADMIN_REPLY, NOT_REGISTERED_REPLY};
