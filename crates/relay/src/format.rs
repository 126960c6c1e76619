//! Hub-facing renderings of game events.

use polychat_protocol::{ChatMessage, PlayerStatus, ServerState};

/// Section sign that starts a game formatting code (`§a`, `§l`, ...).
pub const FORMAT_CODE_MARKER: char = '\u{a7}';

/// Remove game formatting codes: the marker and the character after it.
#[must_use]
pub fn strip_formatting_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == FORMAT_CODE_MARKER {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

/// Break `@everyone`, `@here` and `<@id>` / `<@&role>` tokens with a
/// zero-width space after each `@` so game text never pings the hub.
#[must_use]
pub fn defuse_mentions(text: &str) -> String {
    text.replace('@', "@\u{200b}")
}

fn hub_text(text: &str) -> String {
    defuse_mentions(&strip_formatting_codes(text))
}

/// Render a game chat line for the hub, bolding the sender prefix that ends
/// at `message_offset`.
#[must_use]
pub fn hub_chat_line(chat: &ChatMessage) -> String {
    let offset = chat.message_offset as usize;
    let message = chat.message.as_str();
    if offset == 0 || offset > message.len() || !message.is_char_boundary(offset) {
        return hub_text(message).trim().to_string();
    }
    let (prefix, body) = message.split_at(offset);
    let prefix = hub_text(prefix);
    let body = hub_text(body);
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return body.trim().to_string();
    }
    format!("**{prefix}** {}", body.trim())
}

#[must_use]
pub fn status_notice(server_name: &str, state: ServerState) -> String {
    let marker = match state {
        ServerState::Started => "\u{2705}",
        ServerState::Stopped => "\u{1f6d1}",
        ServerState::Crashed => "\u{1f4a5}",
    };
    format!("{marker} **{}** has {state}", hub_text(server_name))
}

#[must_use]
pub fn player_notice(username: &str, status: PlayerStatus, server_name: &str) -> String {
    let verb = match status {
        PlayerStatus::Joined => "joined",
        PlayerStatus::Left => "left",
    };
    format!(
        "**{}** {verb} **{}**",
        hub_text(username),
        hub_text(server_name)
    )
}

/// Text block for a command result posted to the hub.
#[must_use]
pub fn command_result_text(server_id: &str, command: &str, output: &str) -> String {
    let output = strip_formatting_codes(output);
    let output = output.trim();
    if output.is_empty() {
        return format!("`{command}` on **{server_id}** finished with no output");
    }
    format!("`{command}` on **{server_id}**\n```\n{output}\n```")
}
