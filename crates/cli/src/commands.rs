use std::fmt::Write as _;

use {
    anyhow::Result,
    chrono::{DateTime, Utc},
    polychat_config::{PolychatConfig, UnknownMention},
    polychat_cron::{CronRestartSchedule, restart::describe_remaining},
    polychat_discord::{MentionContext, OfflineDirectory, Sanitizer},
    secrecy::ExposeSecret,
};

pub fn config_summary(cfg: &PolychatConfig) -> String {
    let token = if cfg.discord.token.expose_secret().trim().is_empty() {
        "missing"
    } else {
        "set"
    };
    let mut out = String::from("config OK\n");
    let _ = writeln!(
        out,
        "discord: token {token}, guild {}, relay channel {}",
        cfg.discord.guild_id, cfg.discord.relay_channel_id
    );
    let _ = writeln!(
        out,
        "relay: {:?} framing, max frame {} bytes",
        cfg.relay.framing, cfg.relay.max_frame_bytes
    );
    let _ = writeln!(
        out,
        "broadcast: {} message(s) every {}s",
        cfg.broadcast.messages.len(),
        cfg.broadcast.interval_secs
    );
    let _ = write!(
        out,
        "restarts: {} schedule(s), warning within {}s",
        cfg.restarts.schedules.len(),
        cfg.restarts.warn_within_secs
    );
    out
}

/// Sanitise without a gateway connection: channel and role mentions fall
/// back to their placeholders and no user mention resolves.
pub async fn sanitize(text: &str, unknown_user: UnknownMention) -> Result<String> {
    let ctx = MentionContext {
        users: &[],
        directory: &OfflineDirectory,
        unknown_user,
    };
    Ok(Sanitizer::new()?.sanitise(text, &ctx).await)
}

pub fn restarts(cfg: &PolychatConfig, now: DateTime<Utc>) -> Result<String> {
    let schedule = CronRestartSchedule::from_config(&cfg.restarts)?;
    if schedule.is_empty() {
        return Ok("no restart schedules configured".into());
    }
    let window = cfg.restarts.warn_within();
    let lines: Vec<String> = schedule
        .next_restarts(now)
        .into_iter()
        .map(|restart| {
            let remaining = (restart.at - now).to_std().unwrap_or_default();
            let marker = if remaining <= window {
                "  (warning)"
            } else {
                ""
            };
            format!(
                "{}: {} (in {}){marker}",
                restart.server_id,
                restart.at.to_rfc3339(),
                describe_remaining(remaining)
            )
        })
        .collect();
    Ok(lines.join("\n"))
}
