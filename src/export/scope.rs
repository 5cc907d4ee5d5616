//! Message-range scoping: the first, pure stage of every export pipeline.

use crate::models::{ConversationDocument, ExportScope};
use crate::normalize::rebuild_derived;

/// Slice the document to the requested scope and rebuild derived metadata
/// against the sliced message list only. Returns a new value; the source is
/// untouched.
///
/// Indexes are 1-based and clamped to the document; a reversed range is
/// auto-ordered. A scope that clamps to nothing degrades to the full
/// document rather than producing an empty export.
pub fn apply_scope(doc: &ConversationDocument, scope: ExportScope) -> ConversationDocument {
    let total = doc.messages.len();
    let (start, end) = match scope {
        ExportScope::All => return tagged(doc.clone(), scope),
        ExportScope::Single { index } => {
            let i = index.clamp(1, total.max(1));
            (i, i)
        }
        ExportScope::Range { start, end } => {
            let (a, b) = if start <= end { (start, end) } else { (end, start) };
            (a.clamp(1, total.max(1)), b.clamp(1, total.max(1)))
        }
    };

    if total == 0 {
        return tagged(doc.clone(), scope);
    }

    let messages: Vec<_> = doc.messages[start - 1..end].to_vec();

    let mut flat = Vec::new();
    for message in &messages {
        flat.extend(message.thinking_blocks.iter().cloned());
    }

    let mut scoped = ConversationDocument {
        metadata: doc.metadata.clone(),
        messages,
        thinking_blocks: flat,
    };
    rebuild_derived(&mut scoped.metadata, &scoped.messages, &scoped.thinking_blocks);
    tagged(scoped, scope)
}

fn tagged(mut doc: ConversationDocument, scope: ExportScope) -> ConversationDocument {
    doc.metadata.scope = scope.label();
    doc
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Author, Link, Message, Metadata, ReferenceSet};

    fn message_with_link(id: &str, url: &str) -> Message {
        Message {
            id: id.to_string(),
            author: Author::User,
            content: format!("see {url}"),
            html: None,
            timestamp: Utc::now(),
            word_count: 2,
            character_count: 10,
            thinking_blocks: Vec::new(),
            references: Some(ReferenceSet {
                links: vec![Link { url: url.to_string(), title: url.to_string(), domain: None }],
                ..Default::default()
            }),
        }
    }

    fn six_message_doc() -> ConversationDocument {
        let messages =
            (1..=6).map(|i| message_with_link(&format!("m{i}"), &format!("https://example.com/{i}"))).collect();
        let mut doc = ConversationDocument {
            metadata: Metadata::new("claude", "https://claude.ai/chat/1", "T"),
            messages,
            thinking_blocks: Vec::new(),
        };
        rebuild_derived(&mut doc.metadata, &doc.messages.clone(), &[]);
        doc
    }

    #[test]
    fn test_range_scopes_messages_and_references() {
        let doc = six_message_doc();
        let scoped = apply_scope(&doc, ExportScope::Range { start: 2, end: 4 });
        assert_eq!(scoped.metadata.message_count, 3);
        assert_eq!(scoped.messages[0].id, "m2");
        assert_eq!(scoped.messages[2].id, "m4");
        let urls: Vec<_> =
            scoped.metadata.reference_index.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://example.com/2", "https://example.com/3", "https://example.com/4"]
        );
        assert_eq!(scoped.metadata.scope, "range-2-4");
    }

    #[test]
    fn test_single_clamped_to_document() {
        let doc = six_message_doc();
        let scoped = apply_scope(&doc, ExportScope::Single { index: 99 });
        assert_eq!(scoped.metadata.message_count, 1);
        assert_eq!(scoped.messages[0].id, "m6");
    }

    #[test]
    fn test_reversed_range_auto_ordered() {
        let doc = six_message_doc();
        let scoped = apply_scope(&doc, ExportScope::Range { start: 5, end: 2 });
        assert_eq!(scoped.metadata.message_count, 4);
        assert_eq!(scoped.metadata.scope, "range-2-5");
    }

    #[test]
    fn test_all_is_identity_except_label() {
        let doc = six_message_doc();
        let scoped = apply_scope(&doc, ExportScope::All);
        assert_eq!(scoped.messages, doc.messages);
        assert_eq!(scoped.metadata.scope, "all");
    }

    #[test]
    fn test_source_not_mutated() {
        let doc = six_message_doc();
        let _ = apply_scope(&doc, ExportScope::Single { index: 1 });
        assert_eq!(doc.messages.len(), 6);
        assert_eq!(doc.metadata.message_count, 6);
    }
}
