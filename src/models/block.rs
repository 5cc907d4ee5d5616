use serde::{Deserialize, Serialize};

use super::reference::ReferenceSet;

/// Classification assigned to a trace region found inside an assistant turn.
///
/// Wire names match the snake_case strings used by the capture format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Thinking,
    WebSearch,
    ToolCall,
    PromptChain,
    Code,
    FileEdit,
    Trace,
}

impl BlockType {
    /// Stable wire name, also used for breakdown map keys and graph node ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Thinking => "thinking",
            BlockType::WebSearch => "web_search",
            BlockType::ToolCall => "tool_call",
            BlockType::PromptChain => "prompt_chain",
            BlockType::Code => "code",
            BlockType::FileEdit => "file_edit",
            BlockType::Trace => "trace",
        }
    }

    /// Dedup priority: when two blocks share a signature the higher-priority
    /// classification wins. tool_call/prompt_chain > specific types >
    /// thinking > generic trace.
    pub fn priority(&self) -> u8 {
        match self {
            BlockType::ToolCall | BlockType::PromptChain => 3,
            BlockType::WebSearch | BlockType::Code | BlockType::FileEdit => 2,
            BlockType::Thinking => 1,
            BlockType::Trace => 0,
        }
    }
}

/// A single parsed web-search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Type-specific structured fields parsed out of a trace block.
///
/// Only web_search, tool_call and prompt_chain blocks carry structured data;
/// every other type keeps `None` and relies on raw `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredData {
    WebSearch {
        queries: Vec<String>,
        results: Vec<SearchResult>,
    },
    ToolCall {
        description: String,
        commands: Vec<String>,
        outputs: Vec<String>,
    },
    PromptChain {
        steps: Vec<String>,
    },
}

/// A trace/reasoning unit nested in an assistant message.
///
/// `content` is minimally cleaned: URLs, code fences and status words are
/// semantically meaningful here, unlike message content which is scrubbed of
/// UI chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub summary: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<StructuredData>,
    pub word_count: usize,
    pub character_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ReferenceSet>,
}

/// Length (in characters) of the content prefix used in dedup signatures.
pub const SIGNATURE_CONTENT_PREFIX: usize = 500;

impl Block {
    /// Dedup signature: `summary + '|' + content[:500]`, case-sensitive.
    pub fn signature(&self) -> String {
        let prefix: String = self.content.chars().take(SIGNATURE_CONTENT_PREFIX).collect();
        format!("{}|{}", self.summary, prefix)
    }
}
