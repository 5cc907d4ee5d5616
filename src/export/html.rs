//! Self-contained HTML export with inline styling.

use std::fmt::Write;

use crate::models::{Block, ConversationDocument, ExportOptions, StructuredData};

use super::labels::{author_label, block_heading, breakdown_line};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem;line-height:1.5}\
.message{border-left:3px solid #ccc;padding:0.5rem 1rem;margin:1rem 0}\
.message.user{border-color:#4a90d9}\
.message.assistant{border-color:#7b61a8}\
.author{font-weight:600;margin-bottom:0.25rem}\
.trace{background:#f6f6f6;border-radius:4px;padding:0.5rem 0.75rem;margin:0.5rem 0;font-size:0.9em}\
.trace summary{cursor:pointer;font-weight:600}\
pre{overflow-x:auto;background:#1e1e1e;color:#eee;padding:0.75rem;border-radius:4px}\
.meta{color:#666;font-size:0.85em}";

/// Render the document as a standalone HTML page.
pub fn render(doc: &ConversationDocument, options: &ExportOptions) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        escape(&doc.metadata.title)
    );
    let _ = writeln!(out, "<h1>{}</h1>", escape(&doc.metadata.title));

    if options.include_metadata {
        let _ = writeln!(
            out,
            "<p class=\"meta\">{} &middot; {} messages &middot; exported {}</p>",
            escape(&doc.metadata.platform),
            doc.metadata.message_count,
            doc.metadata.exported_at.to_rfc3339()
        );
        if !doc.metadata.block_type_breakdown.is_empty() {
            let _ = writeln!(
                out,
                "<p class=\"meta\">Blocks: {}</p>",
                escape(&breakdown_line(&doc.metadata.block_type_breakdown))
            );
        }
    }

    for message in &doc.messages {
        let role = message.author.as_str();
        let _ = writeln!(out, "<section class=\"message {role}\">");
        let _ = writeln!(
            out,
            "<div class=\"author\">{}</div>",
            escape(&author_label(message.author, &doc.metadata.platform))
        );

        if options.include_thinking {
            for block in &message.thinking_blocks {
                render_block(&mut out, block);
            }
        }

        match (&message.html, options.include_html) {
            (Some(html), true) => {
                let _ = writeln!(out, "<div class=\"content\">{html}</div>");
            }
            _ => {
                let _ = writeln!(out, "<div class=\"content\"><p>{}</p></div>", escape(&message.content));
            }
        }
        let _ = writeln!(out, "</section>");
    }

    if !doc.metadata.uploaded_documents.is_empty() {
        let _ = writeln!(out, "<h2>Uploaded Documents</h2>\n<ul>");
        for attachment in &doc.metadata.uploaded_documents {
            let _ = writeln!(
                out,
                "<li>{} ({})</li>",
                escape(&attachment.name),
                escape(&attachment.file_type)
            );
        }
        let _ = writeln!(out, "</ul>");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_block(out: &mut String, block: &Block) {
    let _ = writeln!(out, "<details class=\"trace\" open>");
    let heading = block_heading(block.block_type);
    if block.summary.is_empty() {
        let _ = writeln!(out, "<summary>{heading}</summary>");
    } else {
        let _ = writeln!(out, "<summary>{heading}: {}</summary>", escape(&block.summary));
    }

    match &block.structured_data {
        Some(StructuredData::WebSearch { queries, results }) => {
            let _ = writeln!(out, "<ul>");
            for query in queries {
                let _ = writeln!(out, "<li>Query: {}</li>", escape(query));
            }
            for result in results {
                match &result.url {
                    Some(url) => {
                        let _ = writeln!(
                            out,
                            "<li><a href=\"{}\">{}</a></li>",
                            escape(url),
                            escape(&result.title)
                        );
                    }
                    None => {
                        let _ = writeln!(out, "<li>{}</li>", escape(&result.title));
                    }
                }
            }
            let _ = writeln!(out, "</ul>");
        }
        Some(StructuredData::ToolCall { description, commands, outputs }) => {
            if !description.is_empty() {
                let _ = writeln!(out, "<p>{}</p>", escape(description));
            }
            if !commands.is_empty() {
                let _ = writeln!(out, "<pre>{}</pre>", escape(&commands.join("\n")));
            }
            for output in outputs {
                let _ = writeln!(out, "<pre>{}</pre>", escape(output));
            }
        }
        Some(StructuredData::PromptChain { steps }) => {
            let _ = writeln!(out, "<ol>");
            for step in steps {
                let _ = writeln!(out, "<li>{}</li>", escape(step));
            }
            let _ = writeln!(out, "</ol>");
        }
        None => {
            let _ = writeln!(out, "<pre>{}</pre>", escape(&block.content));
        }
    }
    let _ = writeln!(out, "</details>");
}

/// Minimal HTML entity escaping for text nodes and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
