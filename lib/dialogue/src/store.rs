//! The session store.
//!
//! Maps `(flow, conversation)` keys to live sessions and guarantees
//! per-key mutual exclusion: each key owns an async mutex that the engine
//! holds for the duration of a handler's execution, so two events for the
//! same conversation never interleave against the same session, while
//! distinct conversations proceed concurrently.

use crate::flow::FlowName;
use crate::handler::StateId;
use crate::session::{ConversationId, Session};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::sync::Mutex as AsyncMutex;

/// The key under which a session is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    flow: FlowName,
    conversation: ConversationId,
}

impl SessionKey {
    /// Creates a session key.
    #[must_use]
    pub fn new(flow: FlowName, conversation: ConversationId) -> Self {
        Self { flow, conversation }
    }

    /// Returns the flow component.
    #[must_use]
    pub fn flow(&self) -> &FlowName {
        &self.flow
    }

    /// Returns the conversation component.
    #[must_use]
    pub fn conversation(&self) -> &ConversationId {
        &self.conversation
    }
}

/// A point-in-time view of a stored session, for observability and tests.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// The session's current state (`None` for the ENTRY pseudo-state).
    pub state: Option<StateId>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session last handled an event.
    pub last_active_at: DateTime<Utc>,
}

pub(crate) struct Slot<D> {
    pub(crate) session: Option<Session<D>>,
}

/// In-memory session storage with per-key async locking.
pub struct SessionStore<D> {
    slots: StdMutex<HashMap<SessionKey, Arc<AsyncMutex<Slot<D>>>>>,
}

impl<D> SessionStore<D> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: StdMutex::new(HashMap::new()),
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<SessionKey, Arc<AsyncMutex<Slot<D>>>>> {
        // The map is only touched for lookups and inserts; recover from
        // poisoning rather than propagate a panic across conversations.
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns the slot for a key, creating it if absent.
    ///
    /// The returned mutex serializes all handler executions for this
    /// `(flow, conversation)` pair.
    pub(crate) fn slot(&self, key: &SessionKey) -> Arc<AsyncMutex<Slot<D>>> {
        let mut slots = self.lock_slots();
        slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(Slot { session: None })))
            .clone()
    }

    /// Returns the slot for a key only if one already exists.
    ///
    /// Used by dispatch's active-session pass, which must not allocate
    /// slots for flows the conversation never entered.
    pub(crate) fn existing_slot(&self, key: &SessionKey) -> Option<Arc<AsyncMutex<Slot<D>>>> {
        self.lock_slots().get(key).cloned()
    }

    /// Removes a key's slot if it is idle and holds no session.
    ///
    /// Only removes slots nothing else references: a concurrently
    /// dispatched event may already hold the slot's `Arc`, and removing
    /// the map entry under it would let a second slot be created for the
    /// same key, breaking mutual exclusion.
    pub(crate) fn prune(&self, key: &SessionKey) {
        let mut slots = self.lock_slots();
        let removable = slots.get(key).is_some_and(|slot| {
            Arc::strong_count(slot) == 1
                && slot.try_lock().map(|g| g.session.is_none()).unwrap_or(false)
        });
        if removable {
            slots.remove(key);
        }
    }

    /// Returns a snapshot of the session stored under a key, if any.
    ///
    /// Returns `None` while the session is locked by an in-flight
    /// dispatch.
    #[must_use]
    pub fn snapshot(&self, key: &SessionKey) -> Option<SessionInfo> {
        let slots = self.lock_slots();
        let slot = slots.get(key)?;
        let guard = slot.try_lock().ok()?;
        guard.session.as_ref().map(|session| SessionInfo {
            state: session.current_state(),
            created_at: session.created_at(),
            last_active_at: session.last_active_at(),
        })
    }

    /// Returns the number of live sessions. Sessions locked by an
    /// in-flight dispatch are counted as live.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        let slots = self.lock_slots();
        slots
            .values()
            .filter(|slot| match slot.try_lock() {
                Ok(guard) => guard.session.is_some(),
                Err(_) => true,
            })
            .count()
    }

    /// Removes sessions that have been idle longer than `max_age` and
    /// drops empty slots. Sessions locked by an in-flight dispatch are
    /// skipped. Returns the number of sessions removed.
    pub fn sweep_idle(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut slots = self.lock_slots();
        let mut removed = 0;
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let Ok(guard) = slot.try_lock() else {
                return true;
            };
            match guard.session.as_ref() {
                None => false,
                Some(session) if session.last_active_at() < cutoff => {
                    removed += 1;
                    false
                }
                Some(_) => true,
            }
        });
        removed
    }
}

impl<D> Default for SessionStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saffron_core::ChatId;

    fn key(name: &str, chat: i64) -> SessionKey {
        SessionKey::new(
            FlowName::new(name),
            ConversationId::per_chat(ChatId::new(chat)),
        )
    }

    #[tokio::test]
    async fn slot_is_shared_per_key() {
        let store: SessionStore<()> = SessionStore::new();
        let a = store.slot(&key("search", 1));
        let b = store.slot(&key("search", 1));
        let other = store.slot(&key("search", 2));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[tokio::test]
    async fn snapshot_reflects_stored_session() {
        let store: SessionStore<()> = SessionStore::new();
        let key = key("bmi", 5);
        assert!(store.snapshot(&key).is_none());

        {
            let slot = store.slot(&key);
            let mut guard = slot.lock().await;
            guard.session = Some(Session::new(
                key.conversation().clone(),
                key.flow().clone(),
            ));
        }

        let info = store.snapshot(&key).expect("session stored");
        assert!(info.state.is_none());
        assert_eq!(store.active_sessions(), 1);
    }

    #[tokio::test]
    async fn prune_drops_only_empty_unreferenced_slots() {
        let store: SessionStore<()> = SessionStore::new();
        let occupied = key("bmi", 1);
        let empty = key("bmi", 2);

        {
            let slot = store.slot(&occupied);
            let mut guard = slot.lock().await;
            guard.session = Some(Session::new(
                occupied.conversation().clone(),
                occupied.flow().clone(),
            ));
        }
        drop(store.slot(&empty));

        store.prune(&occupied);
        store.prune(&empty);

        assert!(store.snapshot(&occupied).is_some());
        assert_eq!(store.lock_slots().len(), 1);
    }

    #[tokio::test]
    async fn prune_keeps_slots_referenced_elsewhere() {
        let store: SessionStore<()> = SessionStore::new();
        let key = key("search", 9);
        let held = store.slot(&key);

        store.prune(&key);

        // The entry survives, so the held Arc still guards the key.
        assert!(Arc::ptr_eq(&held, &store.slot(&key)));
    }

    #[tokio::test]
    async fn sweep_removes_idle_sessions() {
        let store: SessionStore<()> = SessionStore::new();
        let key = key("search", 3);
        {
            let slot = store.slot(&key);
            let mut guard = slot.lock().await;
            guard.session = Some(Session::new(
                key.conversation().clone(),
                key.flow().clone(),
            ));
        }

        // A generous max-age keeps the fresh session alive.
        assert_eq!(store.sweep_idle(Duration::hours(1)), 0);
        assert!(store.snapshot(&key).is_some());

        // A zero max-age removes it.
        assert_eq!(store.sweep_idle(Duration::zero()), 1);
        assert!(store.snapshot(&key).is_none());
        assert_eq!(store.active_sessions(), 0);
    }
}
