//! Canonical data model for extracted conversations.
//!
//! The central type is [`ConversationDocument`]: the validated, deduplicated,
//! fully-metadata'd in-memory representation that every export format is
//! derived from. Supporting types:
//!
//! - [`Message`] - one conversation turn in DOM/chronological order
//! - [`Block`] - a trace/reasoning unit nested in an assistant turn
//! - [`ReferenceSet`] - links, attachments, documents and citations
//! - [`ExportOptions`] / [`ExportScope`] / [`ExportFormat`] - per-export input
//!
//! All wire shapes use serde with camelCase field names.

pub mod block;
pub mod document;
pub mod options;
pub mod reference;

pub use block::{Block, BlockType, SearchResult, StructuredData};
pub use document::{Author, ConversationDocument, Message, Metadata};
pub use options::{ExportFormat, ExportOptions, ExportScope, PdfOptions};
pub use reference::{Attachment, Citation, Link, ReferenceSet};
