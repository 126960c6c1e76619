//! Configuration for the polychat relay.
//!
//! Loaded from `polychat.toml` (explicit path or the platform config
//! directory), then overlaid with environment overrides and validated.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{TOKEN_ENV_VAR, default_config_path, load, parse},
    schema::{
        BroadcastConfig, DiscordConfig, PolychatConfig, RelayConfig, RestartConfig,
        RestartScheduleEntry, UnknownMention,
    },
};
