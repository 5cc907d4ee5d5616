//! CSV export: one row per message, trace block and uploaded document.

use std::fmt::Write;

use crate::models::{ConversationDocument, ExportOptions};

use super::labels::author_label;

const HEADER: &str = "row_type,id,author,block_type,summary,content,word_count,timestamp";

/// Render the document as CSV with quote-escaped values.
pub fn render(doc: &ConversationDocument, options: &ExportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER}");

    for message in &doc.messages {
        let _ = writeln!(
            out,
            "message,{},{},,,{},{},{}",
            field(&message.id),
            field(&author_label(message.author, &doc.metadata.platform)),
            field(&message.content),
            message.word_count,
            field(&message.timestamp.to_rfc3339()),
        );

        if options.include_thinking {
            for block in &message.thinking_blocks {
                let _ = writeln!(
                    out,
                    "block,{},,{},{},{},{},",
                    field(&block.id),
                    field(block.block_type.as_str()),
                    field(&block.summary),
                    field(&block.content),
                    block.word_count,
                );
            }
        }
    }

    // Uploaded documents reuse the block_type column for the file type and
    // the content column for the URL.
    for attachment in &doc.metadata.uploaded_documents {
        let _ = writeln!(
            out,
            "uploaded_document,{},,{},,{},,",
            field(&attachment.name),
            field(&attachment.file_type),
            field(attachment.url.as_deref().unwrap_or_default()),
        );
    }

    out
}

/// RFC 4180 quoting: always quote, double embedded quotes.
fn field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Author, Block, BlockType, Message, Metadata};

    fn sample() -> ConversationDocument {
        let block = Block {
            id: "b1".to_string(),
            block_type: BlockType::ToolCall,
            summary: "Ran \"cargo\"".to_string(),
            content: "line one\nline two".to_string(),
            structured_data: None,
            word_count: 4,
            character_count: 17,
            references: None,
        };
        ConversationDocument {
            metadata: Metadata::new("claude", "https://claude.ai/chat/1", "T"),
            messages: vec![Message {
                id: "m1".to_string(),
                author: Author::Assistant,
                content: "hello, world".to_string(),
                html: None,
                timestamp: Utc::now(),
                word_count: 2,
                character_count: 12,
                thinking_blocks: vec![block],
                references: None,
            }],
            thinking_blocks: Vec::new(),
        }
    }

    #[test]
    fn test_rows_for_messages_and_blocks() {
        let csv = render(&sample(), &ExportOptions::default());
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("message,\"m1\""));
        assert!(lines.iter().any(|l| l.starts_with("block,\"b1\"")));
    }

    #[test]
    fn test_embedded_quotes_and_commas_escaped() {
        let csv = render(&sample(), &ExportOptions::default());
        assert!(csv.contains("\"hello, world\""));
        assert!(csv.contains("\"Ran \"\"cargo\"\"\""));
    }

    #[test]
    fn test_uploaded_document_row_aligns_with_header() {
        let mut doc = sample();
        doc.metadata.uploaded_documents.push(crate::models::Attachment {
            name: "notes.pdf".to_string(),
            url: Some("https://h.test/notes.pdf".to_string()),
            file_type: "pdf".to_string(),
        });
        let csv = render(&doc, &ExportOptions::default());
        let row = csv.lines().find(|l| l.starts_with("uploaded_document,")).unwrap();
        // row_type,id,author,block_type,summary,content,word_count,timestamp
        assert_eq!(
            row,
            "uploaded_document,\"notes.pdf\",,\"pdf\",,\"https://h.test/notes.pdf\",,"
        );
    }

    #[test]
    fn test_blocks_skipped_when_thinking_excluded() {
        let options = ExportOptions { include_thinking: false, ..Default::default() };
        let csv = render(&sample(), &options);
        assert!(!csv.contains("block,"));
    }
}
