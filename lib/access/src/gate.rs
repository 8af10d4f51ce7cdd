//! `Handler -> Handler` access-gate combinators.
//!
//! Both gates are pure wrappers with no state of their own: they consult
//! the record store, and either delegate to the wrapped handler or
//! short-circuit to terminal with a standard refusal reply. The wrapped
//! handler never runs for a refused actor.

use async_trait::async_trait;
use saffron_dialogue::{Event, HandlerError, Reply, StateHandler, Transition};
use saffron_store::RecordStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Refusal sent to actors that have not registered.
pub const NOT_REGISTERED_REPLY: &str =
    "You're not registered yet. Please register first with /start.";

/// Refusal sent to actors outside the privileged allow-list.
pub const NOT_ADMIN_REPLY: &str = "You don't have access to this command.";

struct RequireAuth<D> {
    store: Arc<dyn RecordStore>,
    inner: Arc<dyn StateHandler<D>>,
}

#[async_trait]
impl<D: Send + 'static> StateHandler<D> for RequireAuth<D> {
    async fn handle(&self, event: &Event, draft: &mut D) -> Result<Transition, HandlerError> {
        match self.store.is_registered(event.actor()).await {
            Ok(true) => self.inner.handle(event, draft).await,
            Ok(false) => {
                debug!(actor = %event.actor(), "refusing unregistered actor");
                refuse(event, NOT_REGISTERED_REPLY).await
            }
            Err(err) => Err(HandlerError::Persistence {
                reason: err.to_string(),
            }),
        }
    }
}

struct AdminOnly<D> {
    store: Arc<dyn RecordStore>,
    inner: Arc<dyn StateHandler<D>>,
}

#[async_trait]
impl<D: Send + 'static> StateHandler<D> for AdminOnly<D> {
    async fn handle(&self, event: &Event, draft: &mut D) -> Result<Transition, HandlerError> {
        match self.store.is_privileged(event.actor()).await {
            Ok(true) => self.inner.handle(event, draft).await,
            Ok(false) => {
                debug!(actor = %event.actor(), "refusing non-privileged actor");
                refuse(event, NOT_ADMIN_REPLY).await
            }
            Err(err) => Err(HandlerError::Persistence {
                reason: err.to_string(),
            }),
        }
    }
}

async fn refuse(event: &Event, message: &str) -> Result<Transition, HandlerError> {
    if let Err(err) = event.reply(Reply::text(message)).await {
        warn!(error = %err, "failed to deliver refusal reply");
    }
    Ok(Transition::End)
}

/// Wraps a handler so it only runs for registered, unbanned actors.
#[must_use]
pub fn require_auth<D: Send + 'static>(
    store: Arc<dyn RecordStore>,
    inner: Arc<dyn StateHandler<D>>,
) -> Arc<dyn StateHandler<D>> {
    Arc::new(RequireAuth { store, inner })
}

/// Wraps a handler so it only runs for actors on the privileged
/// allow-list.
#[must_use]
pub fn admin_only<D: Send + 'static>(
    store: Arc<dyn RecordStore>,
    inner: Arc<dyn StateHandler<D>>,
) -> Arc<dyn StateHandler<D>> {
    Arc::new(AdminOnly { store, inner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use saffron_core::{ActorId, ChatId, RecipeId};
    use saffron_dialogue::{Payload, ReplySink, SinkError};
    use saffron_store::{Profile, Recipe, RecipeFields, StoreError};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store stub with fixed answers and mutation counting.
    #[derive(Default)]
    struct StubStore {
        registered: bool,
        privileged: bool,
        mutations: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for StubStore {
        async fn is_registered(&self, _actor: ActorId) -> Result<bool, StoreError> {
            Ok(self.registered)
        }

        async fn register(
            &self,
            _actor: ActorId,
            _display_name: &str,
            _username: &str,
        ) -> Result<(), StoreError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn is_privileged(&self, _actor: ActorId) -> Result<bool, StoreError> {
            Ok(self.privileged)
        }

        async fn set_banned(&self, _actor: ActorId, _banned: bool) -> Result<bool, StoreError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn save_recipe(
            &self,
            _fields: RecipeFields,
            _owner: ActorId,
        ) -> Result<RecipeId, StoreError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(RecipeId::new())
        }

        async fn update_recipe(
            &self,
            _id: RecipeId,
            _owner: ActorId,
            _fields: RecipeFields,
        ) -> Result<bool, StoreError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn recipe(&self, _id: RecipeId) -> Result<Option<Recipe>, StoreError> {
            Ok(None)
        }

        async fn recipes_by_owner(&self, _owner: ActorId) -> Result<Vec<Recipe>, StoreError> {
            Ok(Vec::new())
        }

        async fn search_recipes(&self, _term: &str) -> Result<Vec<Recipe>, StoreError> {
            Ok(Vec::new())
        }

        async fn save_metric(&self, _actor: ActorId, _value: f64) -> Result<(), StoreError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn profile(&self, _actor: ActorId) -> Result<Option<Profile>, StoreError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<Reply>>,
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn send(&self, reply: Reply) -> Result<(), SinkError> {
            self.sent.lock().unwrap().push(reply);
            Ok(())
        }

        async fn notify(&self, _actor: ActorId, _reply: Reply) -> Result<(), SinkError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StateHandler<()> for CountingHandler {
        async fn handle(&self, _event: &Event, _draft: &mut ()) -> Result<Transition, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Transition::End)
        }
    }

    fn event(sink: &Arc<RecordingSink>) -> Event {
        Event::new(
            ChatId::new(1),
            ActorId::new(2),
            Payload::command("add_recipe", vec![]),
            sink.clone(),
        )
    }

    #[tokio::test]
    async fn unregistered_actor_is_refused_without_running_handler() {
        let store = Arc::new(StubStore::default());
        let inner = Arc::new(CountingHandler::default());
        let gated = require_auth(store.clone(), inner.clone());
        let sink = Arc::new(RecordingSink::default());

        let transition = gated.handle(&event(&sink), &mut ()).await.unwrap();

        assert_eq!(transition, Transition::End);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.mutations.load(Ordering::SeqCst), 0);
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text.as_deref(), Some(NOT_REGISTERED_REPLY));
    }

    #[tokio::test]
    async fn registered_actor_reaches_the_handler() {
        let store = Arc::new(StubStore {
            registered: true,
            ..StubStore::default()
        });
        let inner = Arc::new(CountingHandler::default());
        let gated = require_auth(store, inner.clone());
        let sink = Arc::new(RecordingSink::default());

        gated.handle(&event(&sink), &mut ()).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_gate_blocks_ordinary_actors() {
        let store = Arc::new(StubStore {
            registered: true,
            ..StubStore::default()
        });
        let inner = Arc::new(CountingHandler::default());
        let gated = admin_only(store, inner.clone());
        let sink = Arc::new(RecordingSink::default());

        let transition = gated.handle(&event(&sink), &mut ()).await.unwrap();

        assert_eq!(transition, Transition::End);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent[0].text.as_deref(), Some(NOT_ADMIN_REPLY));
    }

    #[tokio::test]
    async fn admin_gate_admits_privileged_actors() {
        let store = Arc::new(StubStore {
            registered: true,
            privileged: true,
            mutations: AtomicUsize::new(0),
        });
        let inner = Arc::new(CountingHandler::default());
        let gated = admin_only(store, inner.clone());
        let sink = Arc::new(RecordingSink::default());

        gated.handle(&event(&sink), &mut ()).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
