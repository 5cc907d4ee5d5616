//! Graph JSON export: a node/edge projection of the conversation.
//!
//! Node ids are deterministic composite keys, so re-rendering an unchanged
//! document yields a byte-identical graph.

use serde::{Deserialize, Serialize};

use crate::models::{ConversationDocument, ExportOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub kind: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Project the document into its graph form.
pub fn project(doc: &ConversationDocument, options: &ExportOptions) -> ConversationGraph {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    let conversation_id = format!("conversation:{}", doc.metadata.platform);
    nodes.push(GraphNode {
        id: conversation_id.clone(),
        kind: "conversation".to_string(),
        label: doc.metadata.title.clone(),
    });

    for message in &doc.messages {
        let message_id = format!("message:{}", message.id);
        nodes.push(GraphNode {
            id: message_id.clone(),
            kind: "message".to_string(),
            label: format!("{} ({} words)", message.author.as_str(), message.word_count),
        });
        edges.push(GraphEdge {
            from: conversation_id.clone(),
            to: message_id.clone(),
            relation: "contains".to_string(),
        });

        if options.include_thinking {
            for block in &message.thinking_blocks {
                let block_id = format!("trace:{}:{}", message.id, block.id);
                nodes.push(GraphNode {
                    id: block_id.clone(),
                    kind: block.block_type.as_str().to_string(),
                    label: if block.summary.is_empty() {
                        block.block_type.as_str().to_string()
                    } else {
                        block.summary.clone()
                    },
                });
                edges.push(GraphEdge {
                    from: message_id.clone(),
                    to: block_id,
                    relation: "has_trace".to_string(),
                });
            }
        }

        if let Some(refs) = &message.references {
            for link in &refs.links {
                push_reference(
                    &mut nodes,
                    &mut edges,
                    &message_id,
                    &format!("ref:link:{}", link.url),
                    "link",
                    &link.title,
                    "references",
                );
            }
            for document in &refs.documents {
                push_reference(
                    &mut nodes,
                    &mut edges,
                    &message_id,
                    &format!("ref:document:{}", document.name),
                    "document",
                    &document.name,
                    "references",
                );
            }
            for attachment in &refs.attachments {
                push_reference(
                    &mut nodes,
                    &mut edges,
                    &message_id,
                    &format!("ref:attachment:{}", attachment.name),
                    "attachment",
                    &attachment.name,
                    "attached",
                );
            }
        }
    }

    ConversationGraph { nodes, edges }
}

/// Render the graph as pretty JSON.
pub fn render(
    doc: &ConversationDocument,
    options: &ExportOptions,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&project(doc, options))
}

fn push_reference(
    nodes: &mut Vec<GraphNode>,
    edges: &mut Vec<GraphEdge>,
    message_id: &str,
    node_id: &str,
    kind: &str,
    label: &str,
    relation: &str,
) {
    // Shared references produce one node with fan-in edges.
    if !nodes.iter().any(|n| n.id == node_id) {
        nodes.push(GraphNode {
            id: node_id.to_string(),
            kind: kind.to_string(),
            label: label.to_string(),
        });
    }
    edges.push(GraphEdge {
        from: message_id.to_string(),
        to: node_id.to_string(),
        relation: relation.to_string(),
    });
}
