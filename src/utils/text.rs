//! Text cleaning and counting primitives.
//!
//! Message content is aggressively cleaned of UI chrome; block content is
//! only minimally cleaned because URLs, code fences and status words inside a
//! trace are semantically meaningful. Both cleaners are idempotent, which the
//! normalization idempotence property depends on.

/// Single-line UI chrome labels that platforms render inside message bodies
/// (copy buttons, regenerate controls and similar).
const CHROME_LINES: &[&str] = &[
    "copy",
    "copy code",
    "copied",
    "edit",
    "retry",
    "regenerate",
    "share",
    "more actions",
    "read aloud",
    "good response",
    "bad response",
];

/// Aggressive cleaning for message content: strips zero-width characters,
/// drops UI-chrome-only lines, collapses blank runs and intra-line
/// whitespace, trims the result.
pub fn clean_message_text(raw: &str) -> String {
    let without_zw: String =
        raw.chars().filter(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}')).collect();

    let mut lines: Vec<String> = Vec::new();
    for line in without_zw.lines() {
        let collapsed = collapse_spaces(line.trim());
        if CHROME_LINES.contains(&collapsed.to_lowercase().as_str()) {
            continue;
        }
        lines.push(collapsed);
    }

    collapse_blank_runs(&lines).trim().to_string()
}

/// Minimal cleaning for block content: trims and collapses blank runs but
/// preserves line structure, URLs and fence markers.
pub fn clean_block_text(raw: &str) -> String {
    let lines: Vec<String> = raw.lines().map(|l| l.trim_end().to_string()).collect();
    collapse_blank_runs(&lines).trim().to_string()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of Unicode scalar values (not bytes).
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// First `n` characters of `text`, char-boundary safe.
pub fn char_prefix(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

/// Reduce a candidate filename to a safe character set.
///
/// Keeps ASCII alphanumerics, `.`, `_` and `-`; every other run of characters
/// becomes a single `-`. Leading/trailing separators are trimmed.
///
/// # Examples
///
/// ```
/// use ai_chat_exporter::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("my chat: part 2!"), "my-chat-part-2");
/// assert_eq!(sanitize_filename("report_v1.2"), "report_v1.2");
/// ```
pub fn sanitize_filename(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut last_was_sep = true;
    for c in candidate.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
            out.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('-');
            last_was_sep = true;
        }
    }
    out.trim_matches(|c| c == '-' || c == '.').to_string()
}

fn collapse_spaces(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join lines, collapsing runs of blank lines down to one.
fn collapse_blank_runs(lines: &[String]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut prev_blank = false;
    for line in lines {
        let blank = line.trim().is_empty();
        if blank && prev_blank {
            continue;
        }
        out.push(line);
        prev_blank = blank;
    }
    out.join("\n")
}
