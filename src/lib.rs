//! Extraction and export of AI chat conversations from saved HTML pages.
//!
//! The pipeline: a platform selector configuration drives the
//! [`extract::Extractor`] over a page snapshot, [`normalize::normalize`]
//! produces the validated canonical [`models::ConversationDocument`], and the
//! [`export`] generators render it into JSON, Markdown, text, HTML, CSV, a
//! graph projection, a memory pack, a research archive, or (with an embedded
//! layout renderer) PDF/DOCX. [`watcher::TurnWatcher`] supports continuous
//! capture of appended turns, and [`history`] keeps a bounded export log.

pub mod analytics;
pub mod classify;
pub mod cli;
pub mod export;
pub mod extract;
pub mod harvest;
pub mod history;
pub mod models;
pub mod normalize;
pub mod platforms;
pub mod utils;
pub mod watcher;

pub use export::{Artifact, generate};
pub use extract::{ExtractError, Extractor, extract_auto};
pub use models::{ConversationDocument, ExportFormat, ExportOptions, ExportScope};
pub use normalize::{NormalizeError, normalize};
pub use platforms::PlatformRegistry;
