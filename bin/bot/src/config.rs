//! Bot configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! `SAFFRON__`-prefixed environment variables, e.g.
//! `SAFFRON__ADMINS=1,42` or `SAFFRON__SWEEP__ENABLED=true`.

use saffron_core::ActorId;
use serde::Deserialize;

/// Top-level bot configuration.
#[derive(Debug, Default, Deserialize)]
pub struct BotConfig {
    /// Comma-separated privileged actor ids.
    #[serde(default)]
    pub admins: Option<String>,

    /// The simulated console actor.
    #[serde(default)]
    pub actor: ActorConfig,

    /// Idle-session sweeping. Off by default: sessions are volatile and
    /// live until cancelled or the process exits.
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Identity the console transport reports for typed input.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorConfig {
    /// Actor id.
    #[serde(default = "default_actor_id")]
    pub id: i64,
    /// Display name.
    #[serde(default = "default_actor_name")]
    pub name: String,
}

/// Periodic idle-session sweep settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Whether the sweep task runs at all.
    #[serde(default)]
    pub enabled: bool,
    /// Seconds between sweep runs.
    #[serde(default = "default_sweep_interval_seconds")]
    pub interval_seconds: u64,
    /// Sessions idle longer than this are removed.
    #[serde(default = "default_max_idle_seconds")]
    pub max_idle_seconds: i64,
}

fn default_actor_id() -> i64 {
    1000
}

fn default_actor_name() -> String {
    "Console User".to_string()
}

fn default_sweep_interval_seconds() -> u64 {
    300
}

fn default_max_idle_seconds() -> i64 {
    3600
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            id: default_actor_id(),
            name: default_actor_name(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: default_sweep_interval_seconds(),
            max_idle_seconds: default_max_idle_seconds(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a present variable fails to parse.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("SAFFRON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// The privileged allow-list as actor ids; unparseable entries are
    /// skipped.
    #[must_use]
    pub fn admin_actor_ids(&self) -> Vec<ActorId> {
        self.admins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|raw| raw.trim().parse().ok())
            .collect()
    }
}
