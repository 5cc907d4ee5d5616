use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::block::Block;
use super::reference::{Attachment, ReferenceSet};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// Aggregated document metadata, fully recomputed during normalization and
/// again after scoping. Never trusted from extraction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub platform: String,
    pub source_url: String,
    pub title: String,
    pub exported_at: DateTime<Utc>,
    pub message_count: usize,
    pub thinking_block_count: usize,
    pub reference_count: usize,
    pub attachment_count: usize,
    pub citation_count: usize,
    /// Block type wire name -> count. BTreeMap keeps serialization order
    /// deterministic, which the graph round-trip property depends on.
    pub block_type_breakdown: BTreeMap<String, usize>,
    /// Deduplicated union of references across all in-scope messages.
    pub reference_index: ReferenceSet,
    /// Attachments and documents owned by user-authored messages.
    pub uploaded_documents: Vec<Attachment>,
    /// `all`, `single` or `range-<a>-<b>`.
    pub scope: String,
}

/// One conversation turn. Order within a document is DOM/chronological order
/// and is preserved through every transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub author: Author,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
    pub character_count: usize,
    #[serde(default)]
    pub thinking_blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ReferenceSet>,
}

/// The canonical, validated conversation representation that every export is
/// derived from.
///
/// `thinking_blocks` is a derived, deduplicated view over the blocks nested
/// in `messages`; after normalization every element corresponds to exactly
/// one nested block and no two elements share a signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDocument {
    pub metadata: Metadata,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub thinking_blocks: Vec<Block>,
}

impl Metadata {
    /// Fresh metadata shell with zeroed derived fields; counts and indexes
    /// are filled in by normalization.
    pub fn new(platform: &str, source_url: &str, title: &str) -> Self {
        Metadata {
            platform: platform.to_string(),
            source_url: source_url.to_string(),
            title: title.to_string(),
            exported_at: Utc::now(),
            message_count: 0,
            thinking_block_count: 0,
            reference_count: 0,
            attachment_count: 0,
            citation_count: 0,
            block_type_breakdown: BTreeMap::new(),
            reference_index: ReferenceSet::default(),
            uploaded_documents: Vec::new(),
            scope: "all".to_string(),
        }
    }
}

impl Author {
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Assistant => "assistant",
        }
    }
}
