//! Message splitting for Discord's length limits.

/// Discord enforces a 2 000-character limit per message.
pub const MAX_MESSAGE_LEN: usize = 2000;
/// Discord embed description character limit.
pub const MAX_EMBED_DESCRIPTION_LEN: usize = 4096;

/// Split a message into chunks of at most `max_len` bytes.
///
/// Markdown-aware: avoids splitting inside fenced code blocks (command output
/// is posted inside one) and never splits a UTF-8 character.
#[must_use]
pub fn chunk_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining);
            break;
        }
        let split_at = find_split_point(remaining, max_len);
        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk);
        remaining = rest;
    }
    chunks
}

/// Best position to split `text` within `max_len` bytes.
///
/// Prefers newlines outside code fences, then any newline, then the largest
/// character boundary within the limit.
fn find_split_point(text: &str, max_len: usize) -> usize {
    let hard_limit = floor_char_boundary(text, max_len);
    let window = &text[..hard_limit];

    let mut in_fence = false;
    let mut best_outside_fence = None;
    let mut best_any_newline = None;

    for (start, line) in window.split('\n').scan(0usize, |pos, line| {
        let start = *pos;
        *pos += line.len() + 1;
        Some((start, line))
    }) {
        let newline_pos = start + line.len();
        if newline_pos >= hard_limit {
            break;
        }

        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }

        let split = newline_pos + 1;
        best_any_newline = Some(split);
        if !in_fence {
            best_outside_fence = Some(split);
        }
    }

    best_outside_fence
        .or(best_any_newline)
        .unwrap_or(hard_limit)
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    if index == 0 {
        // A limit smaller than the first character still has to make progress.
        text.chars().next().map_or(0, char::len_utf8)
    } else {
        index
    }
}
