//! End-to-end extraction over realistic saved pages.

mod common;

use ai_chat_exporter::extract::{Extractor, extract_auto};
use ai_chat_exporter::models::{Author, BlockType, ConversationDocument, StructuredData};
use ai_chat_exporter::normalize::normalize;
use ai_chat_exporter::platforms::{PlatformRegistry, claude};
use url::Url;

use common::CLAUDE_FIXTURE;

fn extract_fixture(html: &str) -> ConversationDocument {
    let config = claude();
    let base = Url::parse("https://claude.ai/chat/abc123").unwrap();
    let raw = Extractor::new(&config).with_source_url(base).extract(html).unwrap();
    normalize(&raw).unwrap()
}

#[test]
fn test_full_extraction_of_claude_page() {
    let doc = extract_fixture(CLAUDE_FIXTURE);

    assert_eq!(doc.metadata.title, "Planning session");
    assert_eq!(doc.messages.len(), 2);
    assert_eq!(doc.messages[0].author, Author::User);
    assert_eq!(doc.messages[1].author, Author::Assistant);
    assert!(doc.messages[1].content.contains("base case"));
}

#[test]
fn test_trace_blocks_classified() {
    let doc = extract_fixture(CLAUDE_FIXTURE);

    let blocks = &doc.messages[1].thinking_blocks;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].block_type, BlockType::Thinking);
    assert_eq!(blocks[1].block_type, BlockType::WebSearch);

    let Some(StructuredData::WebSearch { queries, results }) = &blocks[1].structured_data else {
        panic!("web search block lost its structured data");
    };
    assert!(!queries.is_empty());
    assert!(!results.is_empty());
}

#[test]
fn test_references_harvested_and_indexed() {
    let doc = extract_fixture(CLAUDE_FIXTURE);

    // notes.pdf classifies as a document; the Wikipedia anchor stays a link.
    assert!(doc.metadata.reference_index.documents.iter().any(|d| d.name == "notes.pdf"));
    assert!(
        doc.metadata
            .reference_index
            .links
            .iter()
            .any(|l| l.url.contains("wikipedia.org"))
    );
    // The user's document shows up as an upload.
    assert!(doc.metadata.uploaded_documents.iter().any(|d| d.name == "notes.pdf"));
}

#[test]
fn test_counts_consistent_after_normalize() {
    let doc = extract_fixture(CLAUDE_FIXTURE);

    assert_eq!(doc.metadata.message_count, doc.messages.len());
    assert_eq!(doc.metadata.thinking_block_count, doc.thinking_blocks.len());
    let nested: usize = doc.messages.iter().map(|m| m.thinking_blocks.len()).sum();
    assert_eq!(doc.thinking_blocks.len(), nested);
    for message in &doc.messages {
        assert_eq!(message.word_count, message.content.split_whitespace().count());
        assert!(message.character_count > 0);
    }
}

#[test]
fn test_normalize_is_idempotent_end_to_end() {
    let config = claude();
    let raw = Extractor::new(&config).extract(CLAUDE_FIXTURE).unwrap();
    let once = normalize(&raw).unwrap();
    let twice = normalize(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_auto_detection_picks_claude() {
    let registry = PlatformRegistry::builtin();
    let (doc, platform) = extract_auto(CLAUDE_FIXTURE, &registry).unwrap();
    assert_eq!(platform, "claude");
    assert_eq!(doc.metadata.platform, "claude");
}

#[test]
fn test_six_turn_page_extracts_in_order() {
    let page = common::six_turn_page();
    let doc = extract_fixture(&page);

    assert_eq!(doc.messages.len(), 6);
    for (i, message) in doc.messages.iter().enumerate() {
        assert!(message.content.contains(&format!("Turn number {}", i + 1)));
        let expected = if i % 2 == 0 { Author::User } else { Author::Assistant };
        assert_eq!(message.author, expected);
    }
}
