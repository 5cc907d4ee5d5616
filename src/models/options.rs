use serde::{Deserialize, Serialize};

/// Output format for a single export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Markdown,
    Text,
    Html,
    Csv,
    Graph,
    MemoryPack,
    Pdf,
    Docx,
    Archive,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
            ExportFormat::Html => "html",
            ExportFormat::Csv => "csv",
            ExportFormat::Graph => "graph.json",
            ExportFormat::MemoryPack => "memory.json",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Archive => "archive.json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json
            | ExportFormat::Graph
            | ExportFormat::MemoryPack
            | ExportFormat::Archive => "application/json",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Text => "text/plain",
            ExportFormat::Html => "text/html",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
            ExportFormat::Html => "html",
            ExportFormat::Csv => "csv",
            ExportFormat::Graph => "graph",
            ExportFormat::MemoryPack => "memory_pack",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Archive => "archive",
        }
    }
}

/// Message-range selection applied before rendering. Indexes are 1-based and
/// clamped to the document; a reversed range is auto-ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExportScope {
    All,
    Single { index: usize },
    Range { start: usize, end: usize },
}

impl ExportScope {
    /// Scope label recorded in metadata and usable in filename templates.
    /// The label set is closed: `all`, `single`, `range-<a>-<b>`. History
    /// records and manifest contexts carry it verbatim.
    pub fn label(&self) -> String {
        match self {
            ExportScope::All => "all".to_string(),
            ExportScope::Single { .. } => "single".to_string(),
            ExportScope::Range { start, end } => {
                let (a, b) = if start <= end { (start, end) } else { (end, start) };
                format!("range-{a}-{b}")
            }
        }
    }
}

impl Default for ExportScope {
    fn default() -> Self {
        ExportScope::All
    }
}

/// PDF page geometry passed through to the layout renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOptions {
    pub page_size: String,
    pub orientation: String,
    pub font_scale: f32,
}

impl Default for PdfOptions {
    fn default() -> Self {
        PdfOptions {
            page_size: "a4".to_string(),
            orientation: "portrait".to_string(),
            font_scale: 1.0,
        }
    }
}

/// Per-export options. Pure input to the generators; exporting never mutates
/// the canonical document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub include_thinking: bool,
    pub include_metadata: bool,
    pub include_html: bool,
    pub redact_sensitive: bool,
    pub include_signature: bool,
    pub scope: ExportScope,
    /// Base filename, substituted for `{base}` in the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Token template, e.g. `{base}_{platform}_{date}_{time}_{scope}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_template: Option<String>,
    pub pdf: PdfOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            include_thinking: true,
            include_metadata: true,
            include_html: false,
            redact_sensitive: false,
            include_signature: false,
            scope: ExportScope::All,
            filename: None,
            filename_template: None,
            pdf: PdfOptions::default(),
        }
    }
}
