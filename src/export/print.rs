//! Print-format (PDF/DOCX) support.
//!
//! Layout is delegated to an external renderer behind [`DocumentRenderer`];
//! this module only builds the format-neutral element stream. The stream
//! uses the same author-label and block-heading helpers as the text formats,
//! so author naming and block counts match across every export.

use thiserror::Error;

use crate::models::{ConversationDocument, ExportOptions, PdfOptions, StructuredData};

use super::labels::{author_label, block_heading, breakdown_line};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("layout engine failed: {0}")]
    Layout(String),
    #[error("unsupported page geometry: {0}")]
    Geometry(String),
}

/// One layout element in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintElement {
    Title(String),
    MetadataLine(String),
    AuthorHeading(String),
    TraceHeading(String),
    Paragraph(String),
    CodeBlock(String),
    ListItem(String),
}

/// The format-neutral document handed to a layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintDocument {
    pub elements: Vec<PrintElement>,
    pub pdf: PdfOptions,
}

/// A pluggable layout engine. The default build ships without one; callers
/// embedding a PDF or DOCX library implement this trait.
pub trait DocumentRenderer {
    fn render_pdf(&self, doc: &PrintDocument) -> Result<Vec<u8>, RenderError>;
    fn render_docx(&self, doc: &PrintDocument) -> Result<Vec<u8>, RenderError>;
}

/// Flatten the scoped+redacted document into a print element stream.
pub fn build_print_document(doc: &ConversationDocument, options: &ExportOptions) -> PrintDocument {
    let mut elements = vec![PrintElement::Title(doc.metadata.title.clone())];

    if options.include_metadata {
        elements.push(PrintElement::MetadataLine(format!(
            "{} | {} messages | exported {}",
            doc.metadata.platform,
            doc.metadata.message_count,
            doc.metadata.exported_at.to_rfc3339()
        )));
        if !doc.metadata.block_type_breakdown.is_empty() {
            elements.push(PrintElement::MetadataLine(format!(
                "Blocks: {}",
                breakdown_line(&doc.metadata.block_type_breakdown)
            )));
        }
    }

    for message in &doc.messages {
        elements.push(PrintElement::AuthorHeading(author_label(
            message.author,
            &doc.metadata.platform,
        )));

        if options.include_thinking {
            for block in &message.thinking_blocks {
                elements.push(PrintElement::TraceHeading(
                    block_heading(block.block_type).to_string(),
                ));
                match &block.structured_data {
                    Some(StructuredData::ToolCall { description, commands, outputs }) => {
                        if !description.is_empty() {
                            elements.push(PrintElement::Paragraph(description.clone()));
                        }
                        if !commands.is_empty() {
                            elements.push(PrintElement::CodeBlock(commands.join("\n")));
                        }
                        for output in outputs {
                            elements.push(PrintElement::CodeBlock(output.clone()));
                        }
                    }
                    Some(StructuredData::WebSearch { queries, results }) => {
                        for query in queries {
                            elements.push(PrintElement::ListItem(format!("Query: {query}")));
                        }
                        for result in results {
                            elements.push(PrintElement::ListItem(result.title.clone()));
                        }
                    }
                    Some(StructuredData::PromptChain { steps }) => {
                        for step in steps {
                            elements.push(PrintElement::ListItem(step.clone()));
                        }
                    }
                    None => elements.push(PrintElement::CodeBlock(block.content.clone())),
                }
            }
        }

        elements.push(PrintElement::Paragraph(message.content.clone()));
    }

    PrintDocument { elements, pdf: options.pdf.clone() }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Author, Block, BlockType, Message, Metadata};

    struct CountingRenderer;

    impl DocumentRenderer for CountingRenderer {
        fn render_pdf(&self, doc: &PrintDocument) -> Result<Vec<u8>, RenderError> {
            Ok(format!("pdf:{}", doc.elements.len()).into_bytes())
        }
        fn render_docx(&self, doc: &PrintDocument) -> Result<Vec<u8>, RenderError> {
            Ok(format!("docx:{}", doc.elements.len()).into_bytes())
        }
    }

    fn sample() -> ConversationDocument {
        ConversationDocument {
            metadata: Metadata::new("claude", "https://claude.ai/chat/1", "Print"),
            messages: vec![Message {
                id: "m1".to_string(),
                author: Author::Assistant,
                content: "body".to_string(),
                html: None,
                timestamp: Utc::now(),
                word_count: 1,
                character_count: 4,
                thinking_blocks: vec![Block {
                    id: "b1".to_string(),
                    block_type: BlockType::Thinking,
                    summary: String::new(),
                    content: "inner".to_string(),
                    structured_data: None,
                    word_count: 1,
                    character_count: 5,
                    references: None,
                }],
                references: None,
            }],
            thinking_blocks: Vec::new(),
        }
    }

    #[test]
    fn test_element_stream_order() {
        let print = build_print_document(&sample(), &ExportOptions::default());
        assert!(matches!(print.elements[0], PrintElement::Title(_)));
        assert!(
            print
                .elements
                .iter()
                .any(|e| matches!(e, PrintElement::AuthorHeading(label) if label == "Claude"))
        );
        assert!(
            print
                .elements
                .iter()
                .any(|e| matches!(e, PrintElement::TraceHeading(h) if h == "Extended Thinking"))
        );
    }

    #[test]
    fn test_renderer_receives_same_stream_for_both_formats() {
        let print = build_print_document(&sample(), &ExportOptions::default());
        let renderer = CountingRenderer;
        let pdf = renderer.render_pdf(&print).unwrap();
        let docx = renderer.render_docx(&print).unwrap();
        let count = |bytes: &[u8]| {
            String::from_utf8_lossy(bytes).split(':').next_back().map(str::to_string)
        };
        assert_eq!(count(&pdf), count(&docx));
    }
}
