//! Declarative flow definitions.
//!
//! A flow is a named, statically declared conversation template: entry
//! points, per-state handler tables, fallbacks, a scoping rule, and a
//! re-entry policy. Flows are data; behavior lives in the handlers they
//! reference. Definitions are immutable after registration.

use crate::error::EngineError;
use crate::event::Payload;
use crate::handler::{StateHandler, StateId};
use crate::pattern::TriggerPattern;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The name of a flow, unique within an engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowName(String);

impl FlowName {
    /// Creates a flow name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FlowName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// How a flow keys its sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoping {
    /// One session per chat; every actor in the chat shares it.
    PerChat,
    /// One session per (chat, actor) pair.
    PerMessage,
}

type HandlerTable<D> = Vec<(TriggerPattern, Arc<dyn StateHandler<D>>)>;

/// A declarative conversation template.
pub struct Flow<D: Send> {
    name: FlowName,
    entry_points: HandlerTable<D>,
    states: HashMap<StateId, HandlerTable<D>>,
    state_order: Vec<StateId>,
    fallbacks: HandlerTable<D>,
    scoping: Scoping,
    allow_reentry: bool,
}

impl<D: Send> Flow<D> {
    /// Creates a flow with the given name, per-chat scoping, and re-entry
    /// disabled.
    #[must_use]
    pub fn new(name: impl Into<FlowName>) -> Self {
        Self {
            name: name.into(),
            entry_points: Vec::new(),
            states: HashMap::new(),
            state_order: Vec::new(),
            fallbacks: Vec::new(),
            scoping: Scoping::PerChat,
            allow_reentry: false,
        }
    }

    /// Adds an entry point. Entry points are tried in insertion order.
    #[must_use]
    pub fn with_entry_point(
        mut self,
        pattern: TriggerPattern,
        handler: Arc<dyn StateHandler<D>>,
    ) -> Self {
        self.entry_points.push((pattern, handler));
        self
    }

    /// Adds a handler for a state. A state may carry several patterns;
    /// the first match wins.
    #[must_use]
    pub fn with_state(
        mut self,
        state: StateId,
        pattern: TriggerPattern,
        handler: Arc<dyn StateHandler<D>>,
    ) -> Self {
        if !self.states.contains_key(&state) {
            self.state_order.push(state);
        }
        self.states.entry(state).or_default().push((pattern, handler));
        self
    }

    /// Adds a fallback, matched regardless of the session's current state.
    #[must_use]
    pub fn with_fallback(
        mut self,
        pattern: TriggerPattern,
        handler: Arc<dyn StateHandler<D>>,
    ) -> Self {
        self.fallbacks.push((pattern, handler));
        self
    }

    /// Sets the scoping rule.
    #[must_use]
    pub fn with_scoping(mut self, scoping: Scoping) -> Self {
        self.scoping = scoping;
        self
    }

    /// Sets the re-entry policy: when enabled, an entry-point match while a
    /// session exists replaces it with a fresh one.
    #[must_use]
    pub fn with_reentry(mut self, allow: bool) -> Self {
        self.allow_reentry = allow;
        self
    }

    /// Returns the flow name.
    #[must_use]
    pub fn name(&self) -> &FlowName {
        &self.name
    }

    /// Returns the scoping rule.
    #[must_use]
    pub fn scoping(&self) -> Scoping {
        self.scoping
    }

    /// Returns the re-entry policy.
    #[must_use]
    pub fn allow_reentry(&self) -> bool {
        self.allow_reentry
    }

    /// Returns true if the flow declares the given state.
    #[must_use]
    pub fn declares(&self, state: StateId) -> bool {
        self.states.contains_key(&state)
    }

    /// Returns the declared states, in declaration order.
    #[must_use]
    pub fn states(&self) -> &[StateId] {
        &self.state_order
    }

    /// Finds the first entry-point handler matching the payload.
    #[must_use]
    pub fn entry_handler(&self, payload: &Payload) -> Option<&Arc<dyn StateHandler<D>>> {
        Self::first_match(&self.entry_points, payload)
    }

    /// Finds the first handler for the given state matching the payload.
    #[must_use]
    pub fn state_handler(
        &self,
        state: StateId,
        payload: &Payload,
    ) -> Option<&Arc<dyn StateHandler<D>>> {
        self.states
            .get(&state)
            .and_then(|table| Self::first_match(table, payload))
    }

    /// Finds the first fallback handler matching the payload.
    #[must_use]
    pub fn fallback_handler(&self, payload: &Payload) -> Option<&Arc<dyn StateHandler<D>>> {
        Self::first_match(&self.fallbacks, payload)
    }

    fn first_match<'a>(
        table: &'a HandlerTable<D>,
        payload: &Payload,
    ) -> Option<&'a Arc<dyn StateHandler<D>>> {
        table
            .iter()
            .find(|(pattern, _)| pattern.matches(payload))
            .map(|(_, handler)| handler)
    }

    /// Validates the definition before registration.
    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.name.as_str().is_empty() {
            return Err(EngineError::InvalidFlow {
                name: self.name.clone(),
                reason: "flow name is empty".to_string(),
            });
        }
        if self.entry_points.is_empty() {
            return Err(EngineError::InvalidFlow {
                name: self.name.clone(),
                reason: "flow has no entry points".to_string(),
            });
        }
        if let Some(state) = self
            .state_order
            .iter()
            .find(|state| self.states.get(state).is_none_or(Vec::is_empty))
        {
            return Err(EngineError::InvalidFlow {
                name: self.name.clone(),
                reason: format!("state {state} has no handlers"),
            });
        }
        Ok(())
    }
}

impl<D: Send> fmt::Debug for Flow<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.name)
            .field("entry_points", &self.entry_points.len())
            .field("states", &self.state_order)
            .field("fallbacks", &self.fallbacks.len())
            .field("scoping", &self.scoping)
            .field("allow_reentry", &self.allow_reentry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::handler::{HandlerError, Transition};
    use async_trait::async_trait;

    struct NoopHandler;

    #[async_trait]
    impl StateHandler<()> for NoopHandler {
        async fn handle(&self, _event: &Event, _draft: &mut ()) -> Result<Transition, HandlerError> {
            Ok(Transition::End)
        }
    }

    const ASKING: StateId = StateId::new("asking");

    fn handler() -> Arc<dyn StateHandler<()>> {
        Arc::new(NoopHandler)
    }

    #[test]
    fn builder_defaults() {
        let flow: Flow<()> = Flow::new("test");
        assert_eq!(flow.name().as_str(), "test");
        assert_eq!(flow.scoping(), Scoping::PerChat);
        assert!(!flow.allow_reentry());
    }

    #[test]
    fn first_matching_entry_wins() {
        let flow = Flow::new("test")
            .with_entry_point(TriggerPattern::Command("start"), handler())
            .with_entry_point(TriggerPattern::Command("start"), handler());

        assert!(flow.entry_handler(&Payload::command("start", vec![])).is_some());
        assert!(flow.entry_handler(&Payload::command("stop", vec![])).is_none());
    }

    #[test]
    fn state_lookup_respects_pattern() {
        let flow = Flow::new("test")
            .with_entry_point(TriggerPattern::Command("start"), handler())
            .with_state(ASKING, TriggerPattern::Text, handler());

        assert!(flow.declares(ASKING));
        assert!(flow.state_handler(ASKING, &Payload::text("hi")).is_some());
        assert!(
            flow.state_handler(ASKING, &Payload::command("start", vec![]))
                .is_none()
        );
        assert!(
            flow.state_handler(StateId::new("other"), &Payload::text("hi"))
                .is_none()
        );
    }

    #[test]
    fn validate_rejects_missing_entry_points() {
        let flow: Flow<()> = Flow::new("test");
        let err = flow.validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidFlow { .. }));
    }

    #[test]
    fn validate_accepts_entry_only_flows() {
        let flow = Flow::new("oneshot")
            .with_entry_point(TriggerPattern::Command("profile"), handler());
        assert!(flow.validate().is_ok());
    }
}
