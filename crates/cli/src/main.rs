use std::path::PathBuf;

use {
    anyhow::{Context, Result},
    chrono::{DateTime, Utc},
    clap::{Parser, Subcommand},
    polychat_config::{PolychatConfig, UnknownMention},
    tracing_subscriber::EnvFilter,
};

mod commands;

/// Operator tooling for the polychat Minecraft/Discord relay.
#[derive(Parser, Debug)]
#[command(name = "polychat", version)]
struct Cli {
    /// Config file. Defaults to `polychat.toml` in the platform config dir.
    #[arg(long, global = true, env = "POLYCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate the configuration.
    CheckConfig {
        /// Also require the settings needed to connect to Discord.
        #[arg(long)]
        discord: bool,
    },
    /// Show how a Discord message would appear in game chat.
    Sanitize {
        text: String,

        /// Keep unresolved user mentions as written instead of a placeholder.
        #[arg(long)]
        echo_unknown: bool,
    },
    /// List the next restart of every scheduled server.
    Restarts {
        /// Reference time (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> Result<PolychatConfig> {
    let path = cli.config.clone().or_else(polychat_config::default_config_path);
    polychat_config::load(cli.config.as_deref()).with_context(|| match path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load config".to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json);
    tracing::debug!(command = ?cli.command, "polychat starting");

    let output = match &cli.command {
        Command::CheckConfig { discord } => {
            let cfg = load_config(&cli)?;
            if *discord {
                cfg.validate_discord()
                    .context("config is not ready for Discord")?;
            }
            commands::config_summary(&cfg)
        },
        Command::Sanitize { text, echo_unknown } => {
            let unknown_user = if *echo_unknown {
                UnknownMention::Echo
            } else {
                UnknownMention::Placeholder
            };
            commands::sanitize(text, unknown_user).await?
        },
        Command::Restarts { at } => {
            let cfg = load_config(&cli)?;
            commands::restarts(&cfg, at.unwrap_or_else(Utc::now))?
        },
    };
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["polychat", "restarts", "--json", "--config", "x.toml"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Restarts { at: None }));
    }

    #[test]
    fn parses_restart_reference_time() {
        let cli = Cli::try_parse_from(["polychat", "restarts", "--at", "2026-03-01T03:50:00Z"])
            .unwrap_or_else(|e| panic!("{e}"));
        let Command::Restarts { at: Some(at) } = cli.command else {
            panic!("expected a reference time");
        };
        assert_eq!(at.to_rfc3339(), "2026-03-01T03:50:00+00:00");
    }
}
