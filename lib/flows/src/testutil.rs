//! Shared fakes and builders for the flow test suites.

use crate::draft::Draft;
use crate::register_all;
use async_trait::async_trait;
use saffron_core::{ActorId, ChatId, MediaKind, MediaRef, RecipeId};
use saffron_dialogue::{Engine, Event, Payload, Reply, ReplySink, SinkError};
use saffron_store::{MemoryStore, Profile, Recipe, RecipeFields, RecordStore, StoreError};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) const CHAT: i64 = 100;
pub(crate) const ACTOR: i64 = 7;

/// Reply sink that records sends and notifications; can be told to fail
/// media deliveries to exercise the degrade path.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub sent: Mutex<Vec<Reply>>,
    pub notified: Mutex<Vec<(ActorId, Reply)>>,
    pub fail_media: bool,
    pub fail_notify: bool,
}

impl RecordingSink {
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|reply| reply.text.clone())
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }

    pub fn media_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|reply| reply.media.is_some())
            .count()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send(&self, reply: Reply) -> Result<(), SinkError> {
        if self.fail_media && reply.media.is_some() {
            let media = reply.media.as_ref().map(|m| m.media.clone()).unwrap();
            return Err(SinkError::MediaUnavailable { media });
        }
        self.sent.lock().unwrap().push(reply);
        Ok(())
    }

    async fn notify(&self, actor: ActorId, reply: Reply) -> Result<(), SinkError> {
        if self.fail_notify {
            return Err(SinkError::Closed {
                reason: "actor blocked the assistant".to_string(),
            });
        }
        self.notified.lock().unwrap().push((actor, reply));
        Ok(())
    }
}

/// Record store that delegates to [`MemoryStore`] while counting calls.
pub(crate) struct CountingStore {
    pub inner: MemoryStore,
    pub searches: AtomicUsize,
    pub mutations: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            searches: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn is_registered(&self, actor: ActorId) -> Result<bool, StoreError> {
        self.inner.is_registered(actor).await
    }

    async fn register(
        &self,
        actor: ActorId,
        display_name: &str,
        username: &str,
    ) -> Result<(), StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.register(actor, display_name, username).await
    }

    async fn is_privileged(&self, actor: ActorId) -> Result<bool, StoreError> {
        self.inner.is_privileged(actor).await
    }

    async fn set_banned(&self, actor: ActorId, banned: bool) -> Result<bool, StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.set_banned(actor, banned).await
    }

    async fn save_recipe(
        &self,
        fields: RecipeFields,
        owner: ActorId,
    ) -> Result<RecipeId, StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.save_recipe(fields, owner).await
    }

    async fn update_recipe(
        &self,
        id: RecipeId,
        owner: ActorId,
        fields: RecipeFields,
    ) -> Result<bool, StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.update_recipe(id, owner, fields).await
    }

    async fn recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        self.inner.recipe(id).await
    }

    async fn recipes_by_owner(&self, owner: ActorId) -> Result<Vec<Recipe>, StoreError> {
        self.inner.recipes_by_owner(owner).await
    }

    async fn search_recipes(&self, term: &str) -> Result<Vec<Recipe>, StoreError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search_recipes(term).await
    }

    async fn save_metric(&self, actor: ActorId, value: f64) -> Result<(), StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.save_metric(actor, value).await
    }

    async fn profile(&self, actor: ActorId) -> Result<Option<Profile>, StoreError> {
        self.inner.profile(actor).await
    }
}

/// Builds an engine with every flow registered against the given store.
pub(crate) fn engine_with_all(store: Arc<dyn RecordStore>) -> Engine<Draft> {
    let mut engine = Engine::new();
    register_all(&mut engine, &store).expect("flows register");
    engine
}

pub(crate) fn event(payload: Payload, sink: &Arc<RecordingSink>) -> Event {
    event_from(CHAT, ACTOR, payload, sink)
}

pub(crate) fn event_from(
    chat: i64,
    actor: i64,
    payload: Payload,
    sink: &Arc<RecordingSink>,
) -> Event {
    Event::new(
        ChatId::new(chat),
        ActorId::new(actor),
        payload,
        sink.clone() as Arc<dyn ReplySink>,
    )
    .with_actor_name("Test User")
}

pub(crate) fn cmd(name: &str) -> Payload {
    Payload::command(name, vec![])
}

pub(crate) fn cmd_args(name: &str, args: &[&str]) -> Payload {
    Payload::command(name, args.iter().map(|a| a.to_string()).collect())
}

pub(crate) fn txt(text: &str) -> Payload {
    Payload::text(text)
}

pub(crate) fn cb(token: String) -> Payload {
    Payload::callback(token)
}

pub(crate) fn photo(reference: &str) -> Payload {
    Payload::media(MediaKind::Photo, MediaRef::new(reference))
}

pub(crate) fn voice(reference: &str) -> Payload {
    Payload::media(MediaKind::Voice, MediaRef::new(reference))
}

/// Registers the default test actor on the store.
pub(crate) async fn register_actor(store: &dyn RecordStore) {
    store
        .register(ActorId::new(ACTOR), "Test User", "tester")
        .await
        .expect("register");
}

/// Drives the creation flow end to end and returns the saved recipe.
pub(crate) async fn create_recipe(
    engine: &Engine<Draft>,
    store: &dyn RecordStore,
    sink: &Arc<RecordingSink>,
    title: &str,
) -> Recipe {
    for payload in [
        cmd("add_recipe"),
        txt(title),
        txt("eggs, herbs"),
        txt("30"),
        txt("beginner"),
        txt("250"),
        txt("mix and fry"),
        txt("no"),
        cmd("skip"),
    ] {
        assert!(
            engine.dispatch(event(payload, sink)).await.is_handled(),
            "creation step not handled"
        );
    }
    let recipes = store
        .recipes_by_owner(ActorId::new(ACTOR))
        .await
        .expect("list");
    recipes
        .into_iter()
        .find(|recipe| recipe.fields.title == title)
        .expect("recipe saved")
}
