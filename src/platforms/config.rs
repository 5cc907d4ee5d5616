use crate::models::Author;

/// Optional per-platform author-detection hook. Receives the outer HTML of a
/// message element and may short-circuit the generic detection chain.
pub type AuthorHint = fn(element_html: &str) -> Option<Author>;

/// CSS-selector configuration for one chat platform.
///
/// A platform is data, not code: the extraction engine is parameterized by
/// one of these records plus the optional [`AuthorHint`] extension hook.
/// Every selector string is treated as "no match" when it fails to parse.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Stable platform id, e.g. `claude`.
    pub platform: &'static str,
    /// Assistant display name used by the text-like exports.
    pub display_name: &'static str,
    /// Ordered conversation-container candidates; first non-empty match wins.
    pub conversation: &'static [&'static str],
    /// Message-shaped elements within the container.
    pub messages: &'static str,
    /// Selectors identifying user turns (matched on the turn or a descendant).
    pub user_markers: &'static [&'static str],
    /// Selectors identifying assistant turns.
    pub assistant_markers: &'static [&'static str],
    /// Designated content container within a turn, if the platform has one.
    pub content: Option<&'static str>,
    /// Attachment-shaped elements.
    pub attachments: &'static str,
    /// Citation-shaped elements.
    pub citations: &'static str,
    /// Timestamp-shaped elements near a turn.
    pub timestamps: &'static str,
    /// Optional author-detection override.
    pub author_hint: Option<AuthorHint>,
}

pub fn claude() -> SelectorConfig {
    SelectorConfig {
        platform: "claude",
        display_name: "Claude",
        conversation: &["div[data-testid=\"conversation\"]", "div.conversation-container", "main"],
        messages: "div[data-testid=\"user-message\"], div[data-testid=\"assistant-message\"], div.message-row",
        user_markers: &["div[data-testid=\"user-message\"]", ".user-message"],
        assistant_markers: &[
            "div[data-testid=\"assistant-message\"]",
            ".font-claude-message",
            ".assistant-message",
        ],
        content: Some("div.message-content, .whitespace-pre-wrap"),
        attachments: "[data-testid=\"file-thumbnail\"], [class*=\"attachment\"]",
        citations: "[class*=\"citation\"], cite",
        timestamps: "time, [data-timestamp]",
        author_hint: None,
    }
}

pub fn chatgpt() -> SelectorConfig {
    SelectorConfig {
        platform: "chatgpt",
        display_name: "ChatGPT",
        conversation: &["main [class*=\"thread\"]", "main"],
        messages: "[data-message-author-role], article[data-testid*=\"conversation-turn\"]",
        user_markers: &["[data-message-author-role=\"user\"]"],
        assistant_markers: &["[data-message-author-role=\"assistant\"]"],
        content: Some(".markdown, .whitespace-pre-wrap"),
        attachments: "[class*=\"attachment\"], [data-testid*=\"file\"]",
        citations: "[class*=\"citation\"], cite",
        timestamps: "time",
        author_hint: None,
    }
}

pub fn gemini() -> SelectorConfig {
    SelectorConfig {
        platform: "gemini",
        display_name: "Gemini",
        conversation: &["chat-window", "main"],
        messages: "user-query, model-response, .conversation-turn",
        user_markers: &["user-query", ".user-query"],
        assistant_markers: &["model-response", ".model-response"],
        content: Some(".markdown, message-content"),
        attachments: "[class*=\"attachment\"], [class*=\"file-preview\"]",
        citations: "[class*=\"citation\"], source-footnote",
        timestamps: "time",
        author_hint: None,
    }
}

pub fn perplexity() -> SelectorConfig {
    SelectorConfig {
        platform: "perplexity",
        display_name: "Perplexity",
        conversation: &["main [class*=\"thread\"]", "main"],
        messages: "[class*=\"pb-md\"], .query-wrapper, .answer-wrapper",
        user_markers: &[".query-wrapper", "[class*=\"query\"]"],
        assistant_markers: &[".answer-wrapper", "[class*=\"answer\"]"],
        content: Some(".prose"),
        attachments: "[class*=\"attachment\"]",
        citations: "a[class*=\"citation\"], [class*=\"citation\"]",
        timestamps: "time",
        author_hint: None,
    }
}

/// Assistant display name for a platform id, sourced from the builtin
/// configs so exports and selector data cannot drift apart.
pub fn display_name(platform: &str) -> &'static str {
    [claude(), chatgpt(), gemini(), perplexity()]
        .iter()
        .find(|c| c.platform == platform)
        .map(|c| c.display_name)
        .unwrap_or_else(|| generic().display_name)
}

/// Desperation config for unknown pages: generic ARIA/markup shapes only.
pub fn generic() -> SelectorConfig {
    SelectorConfig {
        platform: "generic",
        display_name: "Assistant",
        conversation: &["main", "[role=\"main\"]", "body"],
        messages: "[class*=\"message\"], [data-role], article",
        user_markers: &["[class*=\"user\"]", "[data-role=\"user\"]"],
        assistant_markers: &["[class*=\"assistant\"]", "[class*=\"bot\"]", "[data-role=\"assistant\"]"],
        content: None,
        attachments: "[class*=\"attachment\"], [data-file-name]",
        citations: "[class*=\"citation\"], cite",
        timestamps: "time, [data-timestamp]",
        author_hint: None,
    }
}
