use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, info},
};

use crate::{Error, PolychatConfig, Result};

/// Overrides `discord.token` when set.
pub const TOKEN_ENV_VAR: &str = "POLYCHAT_DISCORD_TOKEN";

const CONFIG_FILE_NAME: &str = "polychat.toml";

/// `<platform config dir>/polychat.toml`, if a home directory is known.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "polychat")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Parse TOML text without touching the environment.
pub fn parse(text: &str) -> Result<PolychatConfig> {
    let cfg: PolychatConfig = toml::from_str(text)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load the config file, apply environment overrides and validate.
///
/// An explicit `path` must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn load(path: Option<&Path>) -> Result<PolychatConfig> {
    let mut cfg = match path {
        Some(path) => read_file(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => read_file(&path)?,
            None => {
                info!("no config file found, using defaults");
                PolychatConfig::default()
            },
        },
    };
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    cfg.validate()?;
    Ok(cfg)
}

fn read_file(path: &Path) -> Result<PolychatConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = toml::from_str(&text)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut PolychatConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup(TOKEN_ENV_VAR).filter(|t| !t.trim().is_empty()) {
        debug!("discord token taken from {TOKEN_ENV_VAR}");
        cfg.discord.token = Secret::new(token);
    }
}
