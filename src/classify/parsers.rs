//! Type-specific structured parsers for web_search, tool_call and
//! prompt_chain blocks.
//!
//! Parsing is best-effort over loosely-shaped text. A parser never fails; it
//! returns whatever sub-fields it could recover, and the caller keeps the raw
//! content either way.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{SearchResult, StructuredData};

static QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?im)^\s*search(?:ed|ing)?(?:\s+the\s+web)?(?:\s+for)?[:\s]*"?([^"\n]*)"?\s*$"#)
        .expect("valid query regex")
});

static RESULT_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+results?\b").expect("valid result-count regex"));

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a[^>]*href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#)
        .expect("valid anchor regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

static DOMAIN_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9][a-z0-9.-]*\.(?:com|org|net|io|dev|ai|co|edu|gov)$")
        .expect("valid domain-line regex")
});

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[a-zA-Z0-9_-]*\n(.*?)```").expect("valid fence regex")
});

static STEP_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s+(.+)$").expect("valid step-line regex")
});

/// Maximum fallback step lines taken when a prompt chain has no list markup.
const MAX_FALLBACK_STEPS: usize = 12;

/// Parse queries and results out of a web-search block.
///
/// Queries come from `Searched the web for ...` style lines in content or
/// summary. Results come from anchors in the rich HTML when present, else
/// from alternating (title line, domain line) pairs in the content.
pub fn parse_web_search(content: &str, summary_hint: &str, rich_html_hint: &str) -> StructuredData {
    let mut queries: Vec<String> = Vec::new();
    for source in [content, summary_hint] {
        for caps in QUERY_RE.captures_iter(source) {
            let q = caps.get(1).map_or("", |m| m.as_str()).trim();
            let line = caps.get(0).map_or("", |m| m.as_str()).trim();
            let text = if q.is_empty() { line } else { q };
            if !text.is_empty() && !queries.iter().any(|existing| existing == text) {
                queries.push(text.to_string());
            }
        }
    }

    let mut results = parse_anchor_results(rich_html_hint);
    if results.is_empty() {
        results = parse_line_pair_results(content);
    }

    StructuredData::WebSearch { queries, results }
}

fn parse_anchor_results(rich_html: &str) -> Vec<SearchResult> {
    let mut results = Vec::new();
    for caps in ANCHOR_RE.captures_iter(rich_html) {
        let url = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let inner = caps.get(2).map_or("", |m| m.as_str());
        let title = TAG_RE.replace_all(inner, "").trim().to_string();
        if url.is_empty() || url.starts_with('#') {
            continue;
        }
        results.push(SearchResult {
            title: if title.is_empty() { url.clone() } else { title },
            url: Some(url),
            domain: None,
        });
    }
    results
}

/// Fallback when the platform rendered results without anchors: walk
/// non-empty lines, treating a bare domain line as a result and the previous
/// non-domain line (if any) as its title.
fn parse_line_pair_results(content: &str) -> Vec<SearchResult> {
    let mut results = Vec::new();
    let mut pending_title: Option<&str> = None;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if DOMAIN_LINE_RE.is_match(line) {
            let title = pending_title.take().unwrap_or(line);
            results.push(SearchResult {
                title: title.to_string(),
                url: None,
                domain: Some(line.to_string()),
            });
        } else if RESULT_COUNT_RE.is_match(line) || QUERY_RE.is_match(line) {
            pending_title = None;
        } else {
            pending_title = Some(line);
        }
    }
    results
}

/// Parse a tool-call block into description, commands and outputs.
///
/// Fenced code segments become `commands`; everything after a standalone
/// `Output` line becomes `outputs`; the description is the first line that is
/// neither a fence nor the marker, falling back to the summary.
pub fn parse_tool_call(content: &str, summary_hint: &str) -> StructuredData {
    let mut commands: Vec<String> = FENCE_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    // Shell-prompt lines outside fences also count as commands.
    if commands.is_empty() {
        commands = content
            .lines()
            .filter_map(|l| l.trim().strip_prefix("$ "))
            .map(str::to_string)
            .collect();
    }

    let mut outputs = Vec::new();
    if let Some(idx) = content.lines().position(|l| l.trim() == "Output") {
        let tail: String =
            content.lines().skip(idx + 1).collect::<Vec<_>>().join("\n").trim().to_string();
        if !tail.is_empty() {
            outputs.push(tail);
        }
    }

    let description = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("```") && *l != "Output" && !l.starts_with("$ "))
        .unwrap_or(summary_hint)
        .to_string();

    StructuredData::ToolCall { description, commands, outputs }
}

/// Parse a prompt-chain block into ordered steps.
///
/// Numbered or bulleted lines become steps; without list markup the first
/// twelve non-empty lines stand in.
pub fn parse_prompt_chain(content: &str) -> StructuredData {
    let mut steps: Vec<String> = content
        .lines()
        .filter_map(|l| STEP_LINE_RE.captures(l))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .collect();

    if steps.is_empty() {
        steps = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(MAX_FALLBACK_STEPS)
            .map(str::to_string)
            .collect();
    }

    StructuredData::PromptChain { steps }
}
