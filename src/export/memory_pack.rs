//! Memory-pack export: canonical content plus the graph projection and the
//! analytics report bundled into one artifact. A superset of the other JSON
//! exports, never an independent computation.

use serde::{Deserialize, Serialize};

use crate::analytics::{self, AnalyticsReport};
use crate::models::{Block, ConversationDocument, ExportOptions, Message, Metadata};

use super::graph::{self, ConversationGraph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryPack {
    pub metadata: Metadata,
    pub messages: Vec<Message>,
    pub thinking_blocks: Vec<Block>,
    pub graph: ConversationGraph,
    pub analytics: AnalyticsReport,
}

pub fn render(
    doc: &ConversationDocument,
    options: &ExportOptions,
) -> Result<String, serde_json::Error> {
    let pack = MemoryPack {
        metadata: doc.metadata.clone(),
        messages: doc.messages.clone(),
        thinking_blocks: if options.include_thinking {
            doc.thinking_blocks.clone()
        } else {
            Vec::new()
        },
        graph: graph::project(doc, options),
        analytics: analytics::analyze(doc),
    };
    serde_json::to_string_pretty(&pack)
}
