//! Unicode emoji to game-chat text.
//!
//! The game client cannot render emoji glyphs, so each one becomes either a
//! classic ASCII emoticon or a `:shortcode:`.

pub const UNKNOWN_EMOJI: &str = ":unknown_emoji:";

const VARIATION_SELECTOR: char = '\u{fe0f}';
const TEXT_SELECTOR: char = '\u{fe0e}';
const KEYCAP: char = '\u{20e3}';

/// Known emoji. The longest matching entry wins.
const TABLE: &[(&str, &str)] = &[
    // ASCII emoticons
    ("\u{1f642}", ":)"),
    ("\u{1f600}", ":D"),
    ("\u{1f603}", ":D"),
    ("\u{1f604}", ":D"),
    ("\u{1f609}", ";)"),
    ("\u{1f61b}", ":P"),
    ("\u{1f61c}", ";P"),
    ("\u{1f641}", ":("),
    ("\u{2639}", ":("),
    ("\u{1f622}", ":'("),
    ("\u{1f62e}", ":O"),
    ("\u{1f610}", ":|"),
    ("\u{1f615}", ":/"),
    ("\u{1f60e}", "B)"),
    ("\u{1f607}", "O:)"),
    ("\u{1f608}", ">:)"),
    ("\u{1f620}", ">:("),
    ("\u{1f618}", ":*"),
    ("\u{2764}", "<3"),
    ("\u{1f494}", "</3"),
    // Shortcodes
    ("\u{1f602}", ":joy:"),
    ("\u{1f923}", ":rofl:"),
    ("\u{1f605}", ":sweat_smile:"),
    ("\u{1f606}", ":laughing:"),
    ("\u{1f60a}", ":blush:"),
    ("\u{1f60d}", ":heart_eyes:"),
    ("\u{1f60f}", ":smirk:"),
    ("\u{1f612}", ":unamused:"),
    ("\u{1f614}", ":pensive:"),
    ("\u{1f62d}", ":sob:"),
    ("\u{1f631}", ":scream:"),
    ("\u{1f634}", ":sleeping:"),
    ("\u{1f644}", ":rolling_eyes:"),
    ("\u{1f914}", ":thinking:"),
    ("\u{1f921}", ":clown:"),
    ("\u{1f480}", ":skull:"),
    ("\u{1f525}", ":fire:"),
    ("\u{1f4af}", ":100:"),
    ("\u{2728}", ":sparkles:"),
    ("\u{1f389}", ":tada:"),
    ("\u{1f44d}", ":thumbsup:"),
    ("\u{1f44e}", ":thumbsdown:"),
    ("\u{1f44b}", ":wave:"),
    ("\u{1f44f}", ":clap:"),
    ("\u{1f64f}", ":pray:"),
    ("\u{1f4aa}", ":muscle:"),
    ("\u{1f440}", ":eyes:"),
    ("\u{1f451}", ":crown:"),
    ("\u{1f48e}", ":gem:"),
    ("\u{2694}", ":crossed_swords:"),
    ("\u{1f3f9}", ":bow_and_arrow:"),
    ("\u{26cf}", ":pick:"),
    ("\u{1fa93}", ":axe:"),
    ("\u{1f6e1}", ":shield:"),
    ("\u{1f9df}", ":zombie:"),
    ("\u{1f577}", ":spider:"),
    ("\u{1f40d}", ":snake:"),
    ("\u{1f437}", ":pig:"),
    ("\u{1f42e}", ":cow:"),
    ("\u{1f414}", ":chicken:"),
    ("\u{1f411}", ":sheep:"),
    ("\u{1f436}", ":dog:"),
    ("\u{1f431}", ":cat:"),
    ("\u{1f332}", ":evergreen_tree:"),
    ("\u{1f333}", ":deciduous_tree:"),
    ("\u{1f30d}", ":earth_africa:"),
    ("\u{1f319}", ":crescent_moon:"),
    ("\u{2b50}", ":star:"),
    ("\u{2600}", ":sunny:"),
    ("\u{26a1}", ":zap:"),
    ("\u{2705}", ":white_check_mark:"),
    ("\u{274c}", ":x:"),
    ("\u{26a0}", ":warning:"),
    ("\u{2757}", ":exclamation:"),
    ("\u{2753}", ":question:"),
    ("\u{1f6d1}", ":octagonal_sign:"),
    ("\u{1f4a5}", ":boom:"),
    ("\u{1f4a4}", ":zzz:"),
    ("\u{1f3ae}", ":video_game:"),
    ("\u{1f3c6}", ":trophy:"),
    ("\u{1f381}", ":gift:"),
    ("\u{1f382}", ":birthday:"),
    ("\u{1f355}", ":pizza:"),
    ("\u{1f34e}", ":apple:"),
    ("\u{1f35e}", ":bread:"),
    ("\u{1f356}", ":meat_on_bone:"),
    ("\u{1f680}", ":rocket:"),
    ("\u{1f3e0}", ":house:"),
    ("\u{1f499}", ":blue_heart:"),
    ("\u{1f49a}", ":green_heart:"),
    ("\u{1f49b}", ":yellow_heart:"),
    ("\u{1f49c}", ":purple_heart:"),
    ("\u{1f5a4}", ":black_heart:"),
];

/// Replacement for the emoji at the start of `text`, with the number of
/// bytes it consumed. `None` when `text` does not start with an emoji.
#[must_use]
pub fn lookup(text: &str) -> Option<(&'static str, usize)> {
    if let Some((emoji, replacement)) = TABLE
        .iter()
        .filter(|(emoji, _)| text.starts_with(emoji))
        .max_by_key(|(emoji, _)| emoji.len())
    {
        return Some((replacement, emoji.len()));
    }
    let first = text.chars().next()?;
    is_emoji(first).then_some((UNKNOWN_EMOJI, first.len_utf8()))
}

/// Rewrite every emoji in `text`. Presentation selectors, keycaps and skin
/// tone modifiers are dropped; zero-width joiners are left in place.
#[must_use]
pub fn replace_emoji(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if let Some((replacement, consumed)) = lookup(rest) {
            out.push_str(replacement);
            rest = &rest[consumed..];
            continue;
        }
        if !is_modifier(c) {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn is_modifier(c: char) -> bool {
    matches!(c, VARIATION_SELECTOR | TEXT_SELECTOR | KEYCAP | '\u{1f3fb}'..='\u{1f3ff}')
}

/// Pictographic code points the game client cannot display.
#[must_use]
pub fn is_emoji(c: char) -> bool {
    matches!(
        c,
        '\u{1f000}'..='\u{1f02f}'
            | '\u{1f0cf}'
            | '\u{1f170}'..='\u{1f251}'
            | '\u{1f300}'..='\u{1f3fa}'
            | '\u{1f400}'..='\u{1f64f}'
            | '\u{1f680}'..='\u{1f6ff}'
            | '\u{1f7e0}'..='\u{1f7eb}'
            | '\u{1f900}'..='\u{1f9ff}'
            | '\u{1fa70}'..='\u{1faff}'
            | '\u{231a}'..='\u{231b}'
            | '\u{23e9}'..='\u{23f3}'
            | '\u{23f8}'..='\u{23fa}'
            | '\u{2600}'..='\u{27bf}'
            | '\u{2b05}'..='\u{2b07}'
            | '\u{2b1b}'..='\u{2b1c}'
            | '\u{2b50}'
            | '\u{2b55}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoticons_and_shortcodes() {
        assert_eq!(replace_emoji("hi \u{1f642}"), "hi :)");
        assert_eq!(replace_emoji("\u{2764}\u{fe0f} you"), "<3 you");
        assert_eq!(replace_emoji("gg \u{1f525}\u{1f525}"), "gg :fire::fire:");
    }

    #[test]
    fn skin_tones_are_dropped() {
        assert_eq!(replace_emoji("\u{1f44d}\u{1f3fd}"), ":thumbsup:");
    }

    #[test]
    fn unknown_emoji_gets_placeholder() {
        assert_eq!(replace_emoji("\u{1f9a9}"), UNKNOWN_EMOJI);
    }

    #[test]
    fn plain_text_is_untouched() {
        let text = "plain text: caf\u{e9}, \u{4f60}\u{597d}, 100% <3 \u{2122}";
        assert_eq!(replace_emoji(text), text);
    }

    #[test]
    fn keycap_leaves_the_digit() {
        assert_eq!(replace_emoji("1\u{fe0f}\u{20e3}"), "1");
    }

    #[test]
    fn joiner_sequences_keep_the_joiner() {
        assert_eq!(
            replace_emoji("\u{1f431}\u{200d}\u{1f525}"),
            ":cat:\u{200d}:fire:"
        );
    }
}
