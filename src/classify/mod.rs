//! Block-type classification for trace regions.
//!
//! Ordered heuristics, first match wins: web_search, tool_call, prompt_chain,
//! file_edit, code, then the universal `thinking` fallback. The ordering is
//! load-bearing because the categories overlap. Threshold constants are tuned
//! against platform UI snapshots and live in [`ClassifierThresholds`] so the
//! regression tests below pin their behavior.
//!
//! Classification never fails: an unparseable block degrades to `thinking`
//! with no structured data and the raw content retained.

pub mod parsers;

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{BlockType, StructuredData};

pub use parsers::{parse_prompt_chain, parse_tool_call, parse_web_search};

/// Tunable heuristic constants. Defaults mirror the observed platform UIs;
/// treat as configuration, not truths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    /// Minimum summary length for the "concatenated result titles" check.
    pub search_summary_min_len: usize,
    /// Capitalized-word-start ratio above which a long summary reads as
    /// search-result titles.
    pub search_cap_ratio: f64,
    /// Word floor for the capitalization-ratio check.
    pub search_min_words: usize,
    /// Domain-like tokens in the summary that imply search results.
    pub search_summary_domains: usize,
    /// Domain-like tokens in the rich HTML that imply search results.
    pub search_html_domains: usize,
    /// Fenced code blocks needed for the `code` classification.
    pub code_min_fences: usize,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        ClassifierThresholds {
            search_summary_min_len: 80,
            search_cap_ratio: 0.5,
            search_min_words: 10,
            search_summary_domains: 2,
            search_html_domains: 3,
            code_min_fences: 2,
        }
    }
}

/// Verbs that open a tool-call summary ("Ran npm test", "Created src/lib.rs").
const ACTION_VERBS: &[&str] = &[
    "ran", "created", "viewed", "read", "edited", "wrote", "deleted", "executed", "installed",
    "checked", "find", "check", "test", "run", "get", "install", "search",
];

static DOMAIN_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.(?:com|org|net|io|dev|ai|co|edu|gov)\b")
        .expect("valid domain-token regex")
});

static SHELL_PROMPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\$ .+$").expect("valid shell-prompt regex"));

static FILE_EDIT_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d+\s*-\d+").expect("valid file-edit marker regex"));

static SOURCE_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(rs|py|js|jsx|ts|tsx|go|java|c|cc|cpp|h|hpp|rb|php|swift|kt|sh|css|html|sql|toml|lock)\b")
        .expect("valid source-file regex")
});

/// Assign a block type from the raw extracted content, the collapsed-toggle
/// summary, and the rich HTML of the region.
pub fn classify(
    content: &str,
    summary_hint: &str,
    rich_html_hint: &str,
    thresholds: &ClassifierThresholds,
) -> BlockType {
    if looks_like_web_search(content, summary_hint, rich_html_hint, thresholds) {
        return BlockType::WebSearch;
    }
    if looks_like_tool_call(content, summary_hint) {
        return BlockType::ToolCall;
    }
    if looks_like_prompt_chain(content, summary_hint) {
        return BlockType::PromptChain;
    }
    if looks_like_file_edit(content, summary_hint) {
        return BlockType::FileEdit;
    }
    if looks_like_code(content, summary_hint, thresholds) {
        return BlockType::Code;
    }
    BlockType::Thinking
}

/// Run the type-specific structured parser for types that have one.
pub fn parse_structured(
    block_type: BlockType,
    content: &str,
    summary_hint: &str,
    rich_html_hint: &str,
) -> Option<StructuredData> {
    match block_type {
        BlockType::WebSearch => Some(parse_web_search(content, summary_hint, rich_html_hint)),
        BlockType::ToolCall => Some(parse_tool_call(content, summary_hint)),
        BlockType::PromptChain => Some(parse_prompt_chain(content)),
        _ => None,
    }
}

fn looks_like_web_search(
    content: &str,
    summary: &str,
    rich_html: &str,
    t: &ClassifierThresholds,
) -> bool {
    let content_lower = content.to_lowercase();
    let summary_lower = summary.to_lowercase();
    if content_lower.contains("searched the web")
        || content_lower.contains("search results")
        || summary_lower.contains("searched the web")
        || summary_lower.contains("search results")
    {
        return true;
    }
    if summary_reads_as_result_titles(summary, t) {
        return true;
    }
    if domain_token_count(summary) >= t.search_summary_domains {
        return true;
    }
    if summary.trim_end().ends_with("Done") && summary.len() > t.search_summary_min_len {
        return true;
    }
    domain_token_count(rich_html) >= t.search_html_domains
}

/// Long summaries where most words start capitalized read as a run of
/// concatenated result titles.
fn summary_reads_as_result_titles(summary: &str, t: &ClassifierThresholds) -> bool {
    if summary.len() <= t.search_summary_min_len {
        return false;
    }
    let words: Vec<&str> = summary.split_whitespace().collect();
    if words.len() <= t.search_min_words {
        return false;
    }
    let capitalized = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
        .count();
    capitalized as f64 / words.len() as f64 > t.search_cap_ratio
}

fn domain_token_count(text: &str) -> usize {
    DOMAIN_TOKEN_RE.find_iter(text).count()
}

fn looks_like_tool_call(content: &str, summary: &str) -> bool {
    let summary_lower = summary.to_lowercase();
    let first_word = summary_lower.split_whitespace().next().unwrap_or("");
    if ACTION_VERBS.contains(&first_word) {
        return true;
    }
    if content.lines().any(|l| l.trim() == "Output") {
        return true;
    }
    if content.contains("```bash") || content.contains("```sh") || content.contains("```shell") {
        return true;
    }
    SHELL_PROMPT_RE.is_match(content)
}

fn looks_like_prompt_chain(content: &str, summary: &str) -> bool {
    let haystack = format!("{} {}", summary.to_lowercase(), content.to_lowercase());
    haystack.contains("prompt chain")
        || haystack.contains("system prompt")
        || haystack.contains("instruction chain")
}

fn looks_like_file_edit(content: &str, summary: &str) -> bool {
    FILE_EDIT_MARKER_RE.is_match(summary.trim_start())
        || FILE_EDIT_MARKER_RE.is_match(content.trim_start())
}

fn looks_like_code(content: &str, summary: &str, t: &ClassifierThresholds) -> bool {
    if SOURCE_FILE_RE.is_match(summary) {
        return true;
    }
    let fences = content.matches("```").count() / 2;
    fences >= t.code_min_fences
}
