//! Markdown and plain-text exports: a linear walk of messages in order, with
//! type-specific block rendering.

use std::fmt::Write;

use crate::models::{Block, ConversationDocument, ExportOptions, ReferenceSet, StructuredData};

use super::labels::{author_label, block_heading, breakdown_line};

/// Render the document as Markdown.
pub fn render(doc: &ConversationDocument, options: &ExportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", doc.metadata.title);
    out.push('\n');

    if options.include_metadata {
        let _ = writeln!(out, "> Platform: {}", doc.metadata.platform);
        let _ = writeln!(out, "> Source: {}", doc.metadata.source_url);
        let _ = writeln!(out, "> Exported: {}", doc.metadata.exported_at.to_rfc3339());
        let _ = writeln!(
            out,
            "> Messages: {} | Trace blocks: {}",
            doc.metadata.message_count, doc.metadata.thinking_block_count
        );
        if !doc.metadata.block_type_breakdown.is_empty() {
            let _ = writeln!(out, "> Blocks: {}", breakdown_line(&doc.metadata.block_type_breakdown));
        }
        out.push('\n');
    }

    for message in &doc.messages {
        let _ = writeln!(out, "## {}", author_label(message.author, &doc.metadata.platform));
        out.push('\n');

        if options.include_thinking {
            for block in &message.thinking_blocks {
                render_block(&mut out, block);
            }
        }

        let _ = writeln!(out, "{}", message.content);
        out.push('\n');

        if let Some(refs) = &message.references {
            render_references(&mut out, refs);
        }
    }

    if !doc.metadata.uploaded_documents.is_empty() {
        let _ = writeln!(out, "## Uploaded Documents");
        out.push('\n');
        for attachment in &doc.metadata.uploaded_documents {
            match &attachment.url {
                Some(url) => {
                    let _ = writeln!(out, "- [{}]({url}) ({})", attachment.name, attachment.file_type);
                }
                None => {
                    let _ = writeln!(out, "- {} ({})", attachment.name, attachment.file_type);
                }
            }
        }
        out.push('\n');
    }

    out
}

fn render_block(out: &mut String, block: &Block) {
    let _ = writeln!(out, "### {}", block_heading(block.block_type));
    out.push('\n');
    if !block.summary.is_empty() {
        let _ = writeln!(out, "*{}*", block.summary);
        out.push('\n');
    }

    match &block.structured_data {
        Some(StructuredData::WebSearch { queries, results }) => {
            for query in queries {
                let _ = writeln!(out, "- Query: {query}");
            }
            for result in results {
                match (&result.url, &result.domain) {
                    (Some(url), _) => {
                        let _ = writeln!(out, "- [{}]({url})", result.title);
                    }
                    (None, Some(domain)) => {
                        let _ = writeln!(out, "- {} ({domain})", result.title);
                    }
                    (None, None) => {
                        let _ = writeln!(out, "- {}", result.title);
                    }
                }
            }
            out.push('\n');
        }
        Some(StructuredData::ToolCall { description, commands, outputs }) => {
            if !description.is_empty() {
                let _ = writeln!(out, "{description}");
                out.push('\n');
            }
            if !commands.is_empty() {
                let _ = writeln!(out, "```bash");
                for command in commands {
                    let _ = writeln!(out, "{command}");
                }
                let _ = writeln!(out, "```");
                out.push('\n');
            }
            for output in outputs {
                let _ = writeln!(out, "```\n{output}\n```");
                out.push('\n');
            }
        }
        Some(StructuredData::PromptChain { steps }) => {
            for (i, step) in steps.iter().enumerate() {
                let _ = writeln!(out, "{}. {step}", i + 1);
            }
            out.push('\n');
        }
        None => {
            let _ = writeln!(out, "```\n{}\n```", block.content);
            out.push('\n');
        }
    }
}

fn render_references(out: &mut String, refs: &ReferenceSet) {
    if refs.is_empty() {
        return;
    }
    let _ = writeln!(out, "**References:**");
    for link in &refs.links {
        let _ = writeln!(out, "- [{}]({})", link.title, link.url);
    }
    for doc_ref in &refs.documents {
        match &doc_ref.url {
            Some(url) => {
                let _ = writeln!(out, "- [{}]({url})", doc_ref.name);
            }
            None => {
                let _ = writeln!(out, "- {}", doc_ref.name);
            }
        }
    }
    for citation in &refs.citations {
        match &citation.url {
            Some(url) => {
                let _ = writeln!(out, "- \"{}\" <{url}>", citation.text);
            }
            None => {
                let _ = writeln!(out, "- \"{}\"", citation.text);
            }
        }
    }
    out.push('\n');
}

/// Render the document as plain text: same walk, no markup.
pub fn render_text(doc: &ConversationDocument, options: &ExportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", doc.metadata.title);
    let _ = writeln!(out, "{}", "=".repeat(doc.metadata.title.chars().count().min(72)));
    out.push('\n');

    if options.include_metadata {
        let _ = writeln!(
            out,
            "Platform: {} | Messages: {} | Exported: {}",
            doc.metadata.platform,
            doc.metadata.message_count,
            doc.metadata.exported_at.to_rfc3339()
        );
        out.push('\n');
    }

    for message in &doc.messages {
        let _ = writeln!(out, "[{}]", author_label(message.author, &doc.metadata.platform));
        if options.include_thinking {
            for block in &message.thinking_blocks {
                let _ = writeln!(out, "  ({})", block_heading(block.block_type));
                for line in block.content.lines() {
                    let _ = writeln!(out, "  {line}");
                }
            }
        }
        let _ = writeln!(out, "{}", message.content);
        out.push('\n');
    }

    out
}
