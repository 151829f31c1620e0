//! Text cleanup before layout.
//!
//! Incoming text often comes from chat tools and is sprinkled with markdown
//! punctuation and escaped newlines. This is a fixed character substitution
//! table, not a markdown parser.

/// Checkbox glyphs rewritten to a bullet.
const CHECKBOXES: [char; 2] = ['\u{25A1}', '\u{2610}'];

/// Replacement for a checkbox.
pub const BULLET: &str = "\u{2022} ";

/// Characters removed outright.
const STRIPPED: [char; 2] = ['#', '*'];

/// Rewrite literal `\n` escapes as line breaks, turn checkboxes into
/// bullets, and drop heading/emphasis punctuation.
///
/// ## Example
///
/// ```
/// use tinyprint::render::text::desymbolize;
///
/// assert_eq!(desymbolize("# Todo\\n☐ milk"), " Todo\n•  milk");
/// ```
pub fn desymbolize(text: &str) -> String {
    let unescaped = text.replace("\\n", "\n");
    let mut out = String::with_capacity(unescaped.len());
    for ch in unescaped.chars() {
        if CHECKBOXES.contains(&ch) {
            out.push_str(BULLET);
        } else if !STRIPPED.contains(&ch) {
            out.push(ch);
        }
    }
    out
}

/// Split into trimmed, non-empty lines.
pub fn printable_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// The line with the most characters; the first one wins a tie.
///
/// Character count is a stand-in for rendered width, so with proportional
/// fonts this may not be the widest line.
pub fn longest_line<'a>(lines: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for &line in lines {
        let len = line.chars().count();
        match best {
            Some((_, best_len)) if best_len >= len => {}
            _ => best = Some((line, len)),
        }
    }
    best.map(|(line, _)| line)
}
