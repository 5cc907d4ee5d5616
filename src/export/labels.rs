//! Author and block labeling shared by every human-readable format.
//!
//! PDF/DOCX rendering goes through these same helpers, so author naming and
//! block headings are consistent across formats.

use crate::models::{Author, BlockType};
use crate::platforms;

/// Platform display name for assistant turns; users stay "User". The
/// assistant name comes from the platform selector configs.
pub fn author_label(author: Author, platform: &str) -> String {
    match author {
        Author::User => "User".to_string(),
        Author::Assistant => platforms::config::display_name(platform).to_string(),
    }
}

/// Section heading for a trace block of the given type.
pub fn block_heading(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Thinking => "Extended Thinking",
        BlockType::WebSearch => "Web Search",
        BlockType::ToolCall => "Tool Call",
        BlockType::PromptChain => "Prompt Chain",
        BlockType::Code => "Code",
        BlockType::FileEdit => "File Edit",
        BlockType::Trace => "Trace",
    }
}

/// One-line `type: count` summary of a breakdown map, insertion order of the
/// map (alphabetical, since the map is ordered).
pub fn breakdown_line(breakdown: &std::collections::BTreeMap<String, usize>) -> String {
    breakdown
        .iter()
        .map(|(kind, count)| format!("{kind}: {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}
