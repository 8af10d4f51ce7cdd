//! Console transport: stdin lines in, printed replies out.
//!
//! Line grammar:
//! - `/command arg…` — a command event
//! - `cb:<token>`    — a callback event (as if a button was tapped)
//! - `photo:<ref>` / `voice:<ref>` — media events
//! - anything else   — free text
//! - `:as <id> [name…]` switches the simulated actor, `:quit` exits

use crate::config::ActorConfig;
use async_trait::async_trait;
use saffron_core::{ActorId, ChatId, MediaKind, MediaRef};
use saffron_dialogue::{
    ButtonAction, Engine, Event, Payload, Reply, ReplySink, SinkError,
};
use saffron_flows::Draft;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Errors from the console loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// Reading stdin failed.
    Io { reason: String },
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { reason } => write!(f, "console input failed: {reason}"),
        }
    }
}

impl std::error::Error for ConsoleError {}

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleInput {
    Event(Payload),
    SwitchActor { id: i64, name: Option<String> },
    Quit,
    Empty,
}

fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }
    if line == ":quit" || line == ":q" {
        return ConsoleInput::Quit;
    }
    if let Some(rest) = line.strip_prefix(":as ") {
        let mut parts = rest.split_whitespace();
        if let Some(id) = parts.next().and_then(|raw| raw.parse::<i64>().ok()) {
            let name = parts.collect::<Vec<_>>().join(" ");
            let name = (!name.is_empty()).then_some(name);
            return ConsoleInput::SwitchActor { id, name };
        }
        return ConsoleInput::Empty;
    }
    if let Some(command) = line.strip_prefix('/') {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default().to_string();
        let args = parts.map(str::to_string).collect();
        return ConsoleInput::Event(Payload::Command { name, args });
    }
    if let Some(token) = line.strip_prefix("cb:") {
        return ConsoleInput::Event(Payload::callback(token.trim()));
    }
    if let Some(reference) = line.strip_prefix("photo:") {
        return ConsoleInput::Event(Payload::media(
            MediaKind::Photo,
            MediaRef::new(reference.trim()),
        ));
    }
    if let Some(reference) = line.strip_prefix("voice:") {
        return ConsoleInput::Event(Payload::media(
            MediaKind::Voice,
            MediaRef::new(reference.trim()),
        ));
    }
    ConsoleInput::Event(Payload::text(line))
}

/// Reply sink that prints to stdout.
struct ConsoleSink;

fn print_reply(prefix: &str, reply: &Reply) {
    if let Some(text) = &reply.text {
        for line in text.lines() {
            println!("{prefix} {line}");
        }
    }
    if let Some(attachment) = &reply.media {
        println!("{prefix} [{}: {}]", attachment.kind, attachment.media);
    }
    if let Some(keyboard) = &reply.keyboard {
        for row in keyboard.rows() {
            let rendered: Vec<String> = row
                .iter()
                .map(|button| match &button.action {
                    ButtonAction::Callback { token } => {
                        format!("[{} → cb:{token}]", button.label)
                    }
                    ButtonAction::Input { .. } => format!("[{}]", button.label),
                })
                .collect();
            println!("{prefix}   {}", rendered.join(" "));
        }
    }
}

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn send(&self, reply: Reply) -> Result<(), SinkError> {
        print_reply("bot>", &reply);
        Ok(())
    }

    async fn notify(&self, actor: ActorId, reply: Reply) -> Result<(), SinkError> {
        print_reply(&format!("bot@{actor}>"), &reply);
        Ok(())
    }
}

/// Runs the console loop until EOF or `:quit`.
///
/// # Errors
///
/// Returns a [`ConsoleError`] if reading stdin fails.
pub async fn run(
    engine: Arc<Engine<Draft>>,
    actor: ActorConfig,
) -> saffron_core::Result<(), ConsoleError> {
    let mut actor_id = ActorId::new(actor.id);
    let mut actor_name = actor.name;
    let sink: Arc<dyn ReplySink> = Arc::new(ConsoleSink);

    println!("saffron is running. Type /start to begin, :quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|err| ConsoleError::Io {
                reason: err.to_string(),
            })?;
        let Some(line) = line else {
            break;
        };

        match parse_line(&line) {
            ConsoleInput::Empty => {}
            ConsoleInput::Quit => break,
            ConsoleInput::SwitchActor { id, name } => {
                actor_id = ActorId::new(id);
                if let Some(name) = name {
                    actor_name = name;
                }
                println!("(now speaking as {actor_name}, actor {actor_id})");
            }
            ConsoleInput::Event(payload) => {
                // One chat per actor, like a private conversation.
                let event = Event::new(
                    ChatId::new(actor_id.as_i64()),
                    actor_id,
                    payload,
                    sink.clone(),
                )
                .with_actor_name(actor_name.clone());
                let outcome = engine.dispatch(event).await;
                debug!(?outcome, "dispatched console event");
            }
        }
    }

    Ok(())
}
