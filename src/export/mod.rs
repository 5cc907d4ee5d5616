//! Export generators.
//!
//! Every format runs the same pure pipeline over the canonical document:
//! scope, then optional redaction, then a format-specific render. The source
//! document is never mutated, so bulk exports can run back-to-back against
//! one document.

pub mod archive;
pub mod csv;
pub mod filename;
pub mod graph;
pub mod html;
pub mod json;
pub mod labels;
pub mod manifest;
pub mod markdown;
pub mod memory_pack;
pub mod print;
pub mod redact;
pub mod scope;

use thiserror::Error;

use crate::models::{ConversationDocument, ExportFormat, ExportOptions};

pub use filename::build_filename;
pub use manifest::ExportManifest;
pub use print::{DocumentRenderer, PrintDocument, RenderError};
pub use redact::redact_document;
pub use scope::apply_scope;

/// One rendered export output.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// Present when the options requested a signed manifest.
    pub manifest: Option<ExportManifest>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Run the scope/redact/render pipeline without a print renderer. PDF and
/// DOCX degrade to the HTML rendition with a warning; every other format is
/// produced natively.
pub fn generate(
    doc: &ConversationDocument,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<Artifact, ExportError> {
    generate_with_renderer(doc, format, options, None)
}

/// Same pipeline with an optional layout engine for PDF/DOCX.
pub fn generate_with_renderer(
    doc: &ConversationDocument,
    format: ExportFormat,
    options: &ExportOptions,
    renderer: Option<&dyn DocumentRenderer>,
) -> Result<Artifact, ExportError> {
    let mut prepared = apply_scope(doc, options.scope);
    if options.redact_sensitive {
        prepared = redact_document(&prepared);
    }

    let (bytes, format) = render(&prepared, format, options, renderer)?;
    let name = build_filename(&prepared, format, options);
    let mime_type = format.mime_type().to_string();

    let manifest = options.include_signature.then(|| {
        ExportManifest::for_artifact(
            &name,
            &mime_type,
            &bytes,
            &prepared.metadata.platform,
            &prepared.metadata.scope,
        )
    });

    Ok(Artifact { filename: name, mime_type, bytes, manifest })
}

fn render(
    doc: &ConversationDocument,
    format: ExportFormat,
    options: &ExportOptions,
    renderer: Option<&dyn DocumentRenderer>,
) -> Result<(Vec<u8>, ExportFormat), ExportError> {
    let bytes = match format {
        ExportFormat::Json => json::render(doc, options)?.into_bytes(),
        ExportFormat::Markdown => markdown::render(doc, options).into_bytes(),
        ExportFormat::Text => markdown::render_text(doc, options).into_bytes(),
        ExportFormat::Html => html::render(doc, options).into_bytes(),
        ExportFormat::Csv => csv::render(doc, options).into_bytes(),
        ExportFormat::Graph => graph::render(doc, options)?.into_bytes(),
        ExportFormat::MemoryPack => memory_pack::render(doc, options)?.into_bytes(),
        ExportFormat::Archive => archive::render(doc, options)?.into_bytes(),
        ExportFormat::Pdf | ExportFormat::Docx => {
            return render_print(doc, format, options, renderer);
        }
    };
    Ok((bytes, format))
}

fn render_print(
    doc: &ConversationDocument,
    format: ExportFormat,
    options: &ExportOptions,
    renderer: Option<&dyn DocumentRenderer>,
) -> Result<(Vec<u8>, ExportFormat), ExportError> {
    let Some(renderer) = renderer else {
        tracing::warn!(format = format.as_str(), "no layout renderer, falling back to html");
        return Ok((html::render(doc, options).into_bytes(), ExportFormat::Html));
    };

    let print = print::build_print_document(doc, options);
    let result = match format {
        ExportFormat::Pdf => renderer.render_pdf(&print),
        _ => renderer.render_docx(&print),
    };
    match result {
        Ok(bytes) => Ok((bytes, format)),
        Err(err) => {
            // Export still completes, with a different artifact than asked.
            tracing::warn!(format = format.as_str(), error = %err, "layout failed, falling back to html");
            Ok((html::render(doc, options).into_bytes(), ExportFormat::Html))
        }
    }
}

/// Every non-print format, in a stable order. Used by the bulk-export CLI
/// path.
pub const BULK_FORMATS: &[ExportFormat] = &[
    ExportFormat::Json,
    ExportFormat::Markdown,
    ExportFormat::Text,
    ExportFormat::Html,
    ExportFormat::Csv,
    ExportFormat::Graph,
    ExportFormat::MemoryPack,
    ExportFormat::Archive,
];
