//! Turn extraction: from a parsed HTML snapshot to a raw
//! [`ConversationDocument`].
//!
//! # Error Handling Strategy
//!
//! Two failures are terminal for an extraction attempt and surfaced as typed
//! errors: no conversation container matched, and no messages discovered.
//! Neither is retried here; a caller may retry at a higher level (e.g. after
//! a delay for a slow-loading page). Everything else degrades: a malformed
//! turn is skipped with a debug log, a selector that fails to parse is "no
//! match", and a trace region that cannot be shaped keeps whatever text is
//! visible.
//!
//! The document produced here is *raw*: counts and indexes are provisional
//! until [`crate::normalize::normalize`] has run.

pub mod author;
pub mod traces;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::classify::{self, ClassifierThresholds};
use crate::harvest;
use crate::models::{Block, ConversationDocument, Message, Metadata};
use crate::platforms::SelectorConfig;
use crate::utils::{char_count, char_prefix, clean_block_text, clean_message_text, word_count};

pub use author::resolve_author;
pub use traces::{TraceRegion, discover_trace_regions};

/// Content-prefix length for consecutive-duplicate turn detection.
const DUP_PREFIX_CHARS: usize = 200;

/// Terminal extraction failures. Anything less than these degrades instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no conversation container found ({tried} selector candidates tried)")]
    ContainerNotFound { tried: usize },
    #[error("no messages discovered in conversation container")]
    NoMessages,
}

/// Extraction engine parameterized by a platform selector configuration.
pub struct Extractor<'a> {
    config: &'a SelectorConfig,
    source_url: Option<Url>,
    thresholds: ClassifierThresholds,
    retain_html: bool,
    progress: Option<Box<dyn FnMut(u8) + 'a>>,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a SelectorConfig) -> Self {
        Extractor {
            config,
            source_url: None,
            thresholds: ClassifierThresholds::default(),
            retain_html: false,
            progress: None,
        }
    }

    /// Base URL used to resolve relative hrefs, also recorded in metadata.
    pub fn with_source_url(mut self, url: Url) -> Self {
        self.source_url = Some(url);
        self
    }

    pub fn with_thresholds(mut self, thresholds: ClassifierThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Keep each turn's raw inner markup on the message.
    pub fn with_html_retention(mut self, retain: bool) -> Self {
        self.retain_html = retain;
        self
    }

    /// Receive coarse progress percentages (0-100) during extraction.
    pub fn with_progress(mut self, callback: impl FnMut(u8) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Extract a raw conversation document from an HTML snapshot.
    ///
    /// # Errors
    ///
    /// [`ExtractError::ContainerNotFound`] when no conversation-container
    /// candidate matches, [`ExtractError::NoMessages`] when the container
    /// holds no usable turns.
    pub fn extract(&mut self, html: &str) -> Result<ConversationDocument, ExtractError> {
        let dom = Html::parse_document(html);
        self.report(5);

        let container = self.find_container(&dom)?;
        self.report(10);

        let turn_elements = self.enumerate_turns(container);
        if turn_elements.is_empty() {
            return Err(ExtractError::NoMessages);
        }

        let total = turn_elements.len();
        let mut messages: Vec<Message> = Vec::with_capacity(total);
        for (i, el) in turn_elements.into_iter().enumerate() {
            if let Some(message) = self.extract_turn(el, messages.len()) {
                messages.push(message);
            } else {
                debug!(turn = i, "skipping malformed or empty turn");
            }
            let pct = 10 + ((i + 1) * 80 / total) as u8;
            self.report(pct);
        }

        dedup_consecutive(&mut messages);
        if messages.is_empty() {
            return Err(ExtractError::NoMessages);
        }

        // Trace regions at container level that no turn claimed.
        let top_level_blocks = self.top_level_blocks(container, &messages);

        let mut metadata = Metadata::new(
            self.config.platform,
            self.source_url.as_ref().map(Url::as_str).unwrap_or(""),
            &page_title(&dom),
        );
        metadata.message_count = messages.len();

        self.report(100);
        Ok(ConversationDocument { metadata, messages, thinking_blocks: top_level_blocks })
    }

    fn report(&mut self, pct: u8) {
        if let Some(cb) = self.progress.as_mut() {
            cb(pct.min(100));
        }
    }

    fn find_container<'b>(&self, dom: &'b Html) -> Result<ElementRef<'b>, ExtractError> {
        for candidate in self.config.conversation {
            let Ok(sel) = Selector::parse(candidate) else {
                continue;
            };
            if let Some(el) = dom.select(&sel).next() {
                return Ok(el);
            }
        }
        Err(ExtractError::ContainerNotFound { tried: self.config.conversation.len() })
    }

    /// Enumerate message-shaped elements, dropping script/style content and
    /// collapsing wrappers: an element nested inside another match is the
    /// same logical turn seen twice.
    fn enumerate_turns<'b>(&self, container: ElementRef<'b>) -> Vec<ElementRef<'b>> {
        let Ok(sel) = Selector::parse(self.config.messages) else {
            return Vec::new();
        };
        let matches: Vec<ElementRef<'b>> = container
            .select(&sel)
            .filter(|el| !matches!(el.value().name(), "script" | "style"))
            .collect();

        let ids: Vec<_> = matches.iter().map(|el| el.id()).collect();
        matches
            .into_iter()
            .filter(|el| {
                !el.ancestors().filter_map(ElementRef::wrap).any(|anc| ids.contains(&anc.id()))
            })
            .collect()
    }

    fn extract_turn(&self, el: ElementRef<'_>, index: usize) -> Option<Message> {
        let author = resolve_author(el, self.config);
        let content = clean_message_text(&self.raw_content(el));

        let blocks = self.extract_blocks(el, index);
        if content.is_empty() && blocks.is_empty() {
            return None;
        }

        let references =
            harvest::extract_references(el, self.source_url.as_ref(), self.config).into_option();

        Some(Message {
            id: format!("msg-{:04}", index + 1),
            author,
            content: strip_author_prefix(&content),
            html: self.retain_html.then(|| el.inner_html()),
            timestamp: self.extract_timestamp(el).unwrap_or_else(Utc::now),
            word_count: 0,      // recomputed by normalize
            character_count: 0, // recomputed by normalize
            thinking_blocks: blocks,
            references,
        })
    }

    fn raw_content(&self, el: ElementRef<'_>) -> String {
        if let Some(content_sel) = self.config.content
            && let Ok(sel) = Selector::parse(content_sel)
        {
            let parts: Vec<String> =
                el.select(&sel).map(|c| c.text().collect::<String>()).collect();
            if !parts.is_empty() {
                return parts.join("\n");
            }
        }
        el.text().collect::<String>()
    }

    fn extract_blocks(&self, el: ElementRef<'_>, msg_index: usize) -> Vec<Block> {
        let regions = discover_trace_regions(el);
        let mut blocks: Vec<Block> = Vec::with_capacity(regions.len());
        for (j, region) in regions.into_iter().enumerate() {
            blocks.push(self.block_from_region(region, format!("blk-{:04}-{:02}", msg_index + 1, j + 1)));
        }
        // Overlapping discovery can yield the same region twice.
        let mut seen = std::collections::HashSet::new();
        blocks.retain(|b| seen.insert(b.signature()));
        blocks
    }

    fn block_from_region(&self, region: TraceRegion<'_>, id: String) -> Block {
        let content = clean_block_text(&region.content);
        let block_type =
            classify::classify(&content, &region.summary, &region.inner_html, &self.thresholds);
        let structured_data =
            classify::parse_structured(block_type, &content, &region.summary, &region.inner_html);
        let references = harvest::extract_references(
            region.element,
            self.source_url.as_ref(),
            self.config,
        )
        .into_option();

        Block {
            id,
            block_type,
            summary: region.summary,
            word_count: word_count(&content),
            character_count: char_count(&content),
            content,
            structured_data,
            references,
        }
    }

    fn extract_timestamp(&self, el: ElementRef<'_>) -> Option<DateTime<Utc>> {
        let sel = Selector::parse(self.config.timestamps).ok()?;
        for node in el.select(&sel) {
            let raw = node
                .value()
                .attr("datetime")
                .or_else(|| node.value().attr("data-timestamp"))
                .map(str::to_string)
                .unwrap_or_else(|| node.text().collect::<String>().trim().to_string());
            if let Some(ts) = parse_timestamp(&raw) {
                return Some(ts);
            }
        }
        None
    }

    /// Container-level trace regions that fall outside every message element.
    fn top_level_blocks(&self, container: ElementRef<'_>, messages: &[Message]) -> Vec<Block> {
        let claimed: std::collections::HashSet<String> = messages
            .iter()
            .flat_map(|m| m.thinking_blocks.iter().map(Block::signature))
            .collect();
        discover_trace_regions(container)
            .into_iter()
            .enumerate()
            .map(|(j, region)| self.block_from_region(region, format!("blk-top-{:02}", j + 1)))
            .filter(|b| !claimed.contains(&b.signature()))
            .collect()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(epoch) = raw.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0);
    }
    None
}

/// Drop a leading literal role label so the label heuristic does not leak
/// into content.
fn strip_author_prefix(content: &str) -> String {
    for prefix in ["You:", "User:", "Me:", "Assistant:", "Claude:", "ChatGPT:", "Gemini:", "AI:"] {
        if let Some(rest) = content.strip_prefix(prefix) {
            return rest.trim_start().to_string();
        }
    }
    content.to_string()
}

/// Collapse consecutive messages with identical (author, content-prefix)
/// signature, an artifact of overlapping selector matches.
fn dedup_consecutive(messages: &mut Vec<Message>) {
    messages.dedup_by(|b, a| {
        a.author == b.author
            && char_prefix(&a.content, DUP_PREFIX_CHARS) == char_prefix(&b.content, DUP_PREFIX_CHARS)
    });
}

/// Extract with a registry-detected platform instead of an explicit config.
pub fn extract_auto(
    html: &str,
    registry: &crate::platforms::PlatformRegistry,
) -> Result<(ConversationDocument, String), ExtractError> {
    let dom = Html::parse_document(html);
    let config = registry
        .detect(&dom)
        .ok_or(ExtractError::ContainerNotFound { tried: 0 })?;
    let doc = Extractor::new(config).extract(html)?;
    Ok((doc, config.platform.to_string()))
}

fn page_title(dom: &Html) -> String {
    for sel_str in ["title", "h1"] {
        if let Ok(sel) = Selector::parse(sel_str)
            && let Some(el) = dom.select(&sel).next()
        {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }
    }
    "Conversation".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;
    use crate::platforms::config::claude;

    const CLAUDE_PAGE: &str = r#"<html><head><title>Recursion chat</title></head><body>
        <main><div data-testid="conversation">
            <div data-testid="user-message">Explain recursion</div>
            <div data-testid="assistant-message">
                <details><summary>Thought for 4s</summary>Let me think about this carefully</details>
                <div class="message-content">Recursion is a function calling itself.</div>
            </div>
        </div></main></body></html>"#;

    #[test]
    fn test_extracts_two_turns() {
        let config = claude();
        let doc = Extractor::new(&config).extract(CLAUDE_PAGE).unwrap();
        assert_eq!(doc.messages.len(), 2);
        assert_eq!(doc.messages[0].author, Author::User);
        assert_eq!(doc.messages[0].content, "Explain recursion");
        assert_eq!(doc.messages[1].author, Author::Assistant);
        assert!(doc.messages[1].content.contains("Recursion is a function calling itself."));
        assert_eq!(doc.metadata.title, "Recursion chat");
    }

    #[test]
    fn test_trace_block_attached_to_assistant() {
        let config = claude();
        let doc = Extractor::new(&config).extract(CLAUDE_PAGE).unwrap();
        let blocks = &doc.messages[1].thinking_blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].summary, "Thought for 4s");
        assert!(blocks[0].content.contains("Let me think about this carefully"));
    }

    #[test]
    fn test_container_not_found() {
        let mut config = claude();
        config.conversation = &["div.does-not-exist"];
        let err = Extractor::new(&config).extract("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, ExtractError::ContainerNotFound { tried: 1 }));
    }

    #[test]
    fn test_unparseable_container_candidate_falls_through() {
        // A selector string that does not parse is "no match": the chain
        // moves on to the next candidate instead of erroring.
        let mut config = claude();
        config.conversation = &["div[[bad", "main"];
        let doc = Extractor::new(&config).extract(CLAUDE_PAGE).unwrap();
        assert_eq!(doc.messages.len(), 2);
    }

    #[test]
    fn test_all_container_candidates_unparseable_is_not_found() {
        let mut config = claude();
        config.conversation = &["div[[bad", ":::nope"];
        let err = Extractor::new(&config).extract(CLAUDE_PAGE).unwrap_err();
        assert!(matches!(err, ExtractError::ContainerNotFound { tried: 2 }));
    }

    #[test]
    fn test_no_messages() {
        let err = Extractor::new(&claude())
            .extract("<html><body><main><p>empty page</p></main></body></html>")
            .unwrap_err();
        assert!(matches!(err, ExtractError::NoMessages));
    }

    #[test]
    fn test_consecutive_duplicate_turns_collapse() {
        let page = r#"<main>
            <div class="message-row user-message">same question</div>
            <div class="message-row user-message">same question</div>
            <div class="message-row assistant-message">an answer</div>
        </main>"#;
        let config = claude();
        let doc = Extractor::new(&config).extract(page).unwrap();
        assert_eq!(doc.messages.len(), 2);
        assert_eq!(doc.messages[0].content, "same question");
    }

    #[test]
    fn test_nested_wrapper_collapses_to_one_turn() {
        let page = r#"<main>
            <div class="message-row"><div class="message-row user-message">hi</div></div>
            <div class="message-row assistant-message">hello</div>
        </main>"#;
        let config = claude();
        let doc = Extractor::new(&config).extract(page).unwrap();
        assert_eq!(doc.messages.len(), 2);
    }

    #[test]
    fn test_empty_turn_dropped() {
        let page = r#"<main>
            <div class="message-row user-message">   </div>
            <div class="message-row user-message">real question</div>
            <div class="message-row assistant-message">answer</div>
        </main>"#;
        let config = claude();
        let doc = Extractor::new(&config).extract(page).unwrap();
        assert_eq!(doc.messages.len(), 2);
        assert_eq!(doc.messages[0].content, "real question");
    }

    #[test]
    fn test_timestamp_from_time_element() {
        let page = r#"<main>
            <div class="message-row user-message">q
                <time datetime="2024-03-01T10:00:00Z"></time>
            </div>
        </main>"#;
        let config = claude();
        let doc = Extractor::new(&config).extract(page).unwrap();
        assert_eq!(
            doc.messages[0].timestamp,
            DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").unwrap().with_timezone(&Utc)
        );
    }

    #[test]
    fn test_progress_reaches_completion() {
        let mut seen: Vec<u8> = Vec::new();
        let config = claude();
        {
            let mut extractor = Extractor::new(&config).with_progress(|p| seen.push(p));
            extractor.extract(CLAUDE_PAGE).unwrap();
        }
        assert_eq!(seen.last().copied(), Some(100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_author_prefix_stripped_from_content() {
        let page = r#"<main><div class="message-row">You: what is a trait?</div></main>"#;
        let config = claude();
        let doc = Extractor::new(&config).extract(page).unwrap();
        assert_eq!(doc.messages[0].author, Author::User);
        assert_eq!(doc.messages[0].content, "what is a trait?");
    }

    #[test]
    fn test_extract_auto_detects_platform() {
        let registry = crate::platforms::PlatformRegistry::builtin();
        let (doc, platform) = extract_auto(CLAUDE_PAGE, &registry).unwrap();
        assert_eq!(platform, "claude");
        assert_eq!(doc.metadata.platform, "claude");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15T10:30:00Z").is_some());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_some());
        assert!(parse_timestamp("1705314600").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
