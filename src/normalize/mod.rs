//! Normalization and validation of extracted documents.
//!
//! `normalize` is the gate every document passes before any export touches
//! it. It is idempotent (`normalize(normalize(x)) == normalize(x)`) and never
//! mutates its input; extraction-time counts are recomputed, never trusted.

use std::collections::BTreeMap;
use std::collections::HashMap;

use thiserror::Error;

use crate::models::{
    Attachment, Author, Block, ConversationDocument, Message, ReferenceSet,
};
use crate::utils::{char_count, char_prefix, clean_block_text, clean_message_text, word_count};

/// Content-prefix length for consecutive-duplicate message detection.
const DUP_PREFIX_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// An export with no content is never produced silently.
    #[error("document contains no messages after normalization")]
    EmptyDocument,
}

/// Produce the canonical, validated form of an extracted document.
///
/// - recomputes word/character counts for every message and block
/// - drops messages that are empty after cleaning and have no blocks
/// - collapses consecutive (author, content-prefix) duplicates
/// - rebuilds the flat block list by signature dedup with type priority
/// - recomputes all derived metadata (counts, breakdown, reference index,
///   uploaded documents)
///
/// # Errors
///
/// [`NormalizeError::EmptyDocument`] when zero messages remain.
pub fn normalize(doc: &ConversationDocument) -> Result<ConversationDocument, NormalizeError> {
    let mut messages: Vec<Message> = Vec::with_capacity(doc.messages.len());

    for message in &doc.messages {
        let content = clean_message_text(&message.content);
        let mut blocks: Vec<Block> = message.thinking_blocks.iter().map(recount_block).collect();
        blocks = dedup_blocks(blocks);

        if content.is_empty() && blocks.is_empty() {
            continue;
        }

        messages.push(Message {
            id: message.id.clone(),
            author: message.author,
            word_count: word_count(&content),
            character_count: char_count(&content),
            content,
            html: message.html.clone(),
            timestamp: message.timestamp,
            thinking_blocks: blocks,
            references: message.references.clone().and_then(ReferenceSet::into_option),
        });
    }

    messages.dedup_by(|b, a| {
        a.author == b.author
            && char_prefix(&a.content, DUP_PREFIX_CHARS) == char_prefix(&b.content, DUP_PREFIX_CHARS)
    });

    if messages.is_empty() {
        return Err(NormalizeError::EmptyDocument);
    }

    // Flat view: union of nested blocks plus directly-collected top-level
    // blocks, deduplicated by signature with type priority.
    let mut flat: Vec<Block> = Vec::new();
    for message in &messages {
        flat.extend(message.thinking_blocks.iter().cloned());
    }
    flat.extend(doc.thinking_blocks.iter().map(recount_block));
    let thinking_blocks = dedup_blocks(flat);

    let mut metadata = doc.metadata.clone();
    rebuild_derived(&mut metadata, &messages, &thinking_blocks);

    Ok(ConversationDocument { metadata, messages, thinking_blocks })
}

/// Recompute every derived metadata field from the message list. Shared with
/// export scoping so a scoped document never carries whole-conversation
/// metadata.
pub fn rebuild_derived(
    metadata: &mut crate::models::Metadata,
    messages: &[Message],
    thinking_blocks: &[Block],
) {
    metadata.message_count = messages.len();
    metadata.thinking_block_count = thinking_blocks.len();

    let mut breakdown: BTreeMap<String, usize> = BTreeMap::new();
    for block in thinking_blocks {
        *breakdown.entry(block.block_type.as_str().to_string()).or_insert(0) += 1;
    }
    metadata.block_type_breakdown = breakdown;

    let mut index = ReferenceSet::default();
    let mut uploaded: Vec<Attachment> = Vec::new();
    for message in messages {
        if let Some(refs) = &message.references {
            index.merge(refs);
            if message.author == Author::User {
                uploaded.extend(refs.attachments.iter().cloned());
                uploaded.extend(refs.documents.iter().cloned());
            }
        }
        for block in &message.thinking_blocks {
            if let Some(refs) = &block.references {
                index.merge(refs);
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    uploaded.retain(|a| seen.insert(format!("{}|{:?}|{}", a.name, a.url, a.file_type)));

    metadata.reference_count = index.links.len() + index.documents.len();
    metadata.attachment_count = index.attachments.len();
    metadata.citation_count = index.citations.len();
    metadata.reference_index = index;
    metadata.uploaded_documents = uploaded;
}

fn recount_block(block: &Block) -> Block {
    let content = clean_block_text(&block.content);
    Block {
        id: block.id.clone(),
        block_type: block.block_type,
        summary: block.summary.trim().to_string(),
        word_count: word_count(&content),
        character_count: char_count(&content),
        content,
        structured_data: block.structured_data.clone(),
        references: block.references.clone().and_then(ReferenceSet::into_option),
    }
}

/// Signature-based dedup preserving first-seen order. On collision the
/// higher-priority classification wins and its metadata is merged over the
/// lower-priority block.
fn dedup_blocks(blocks: Vec<Block>) -> Vec<Block> {
    let mut order: Vec<String> = Vec::with_capacity(blocks.len());
    let mut by_sig: HashMap<String, Block> = HashMap::with_capacity(blocks.len());

    for block in blocks {
        let sig = block.signature();
        match by_sig.get_mut(&sig) {
            None => {
                order.push(sig.clone());
                by_sig.insert(sig, block);
            }
            Some(existing) => {
                if block.block_type.priority() > existing.block_type.priority() {
                    *existing = merge_blocks(block, existing.clone());
                } else {
                    *existing = merge_blocks(existing.clone(), block);
                }
            }
        }
    }

    order.into_iter().filter_map(|sig| by_sig.remove(&sig)).collect()
}

/// `winner` keeps its type and fields; gaps are filled from `loser`.
fn merge_blocks(mut winner: Block, loser: Block) -> Block {
    if winner.structured_data.is_none() {
        winner.structured_data = loser.structured_data;
    }
    if winner.summary.is_empty() {
        winner.summary = loser.summary;
    }
    match (&mut winner.references, loser.references) {
        (Some(w), Some(l)) => w.merge(&l),
        (w @ None, Some(l)) => *w = Some(l),
        _ => {}
    }
    if winner.content.len() < loser.content.len() {
        // Same 500-char signature prefix; the longer body carries more.
        winner.word_count = word_count(&loser.content);
        winner.character_count = char_count(&loser.content);
        winner.content = loser.content;
    }
    winner
}
