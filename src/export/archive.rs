//! Research-archive export: the scoped document, its analytics report, and
//! optionally the raw HTML snapshots, wrapped in one JSON envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{self, AnalyticsReport};
use crate::models::{ConversationDocument, ExportOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchArchive {
    pub archived_at: DateTime<Utc>,
    pub document: ConversationDocument,
    pub analytics: AnalyticsReport,
    /// Raw per-message markup, present only when HTML retention is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_snapshots: Option<Vec<String>>,
}

pub fn render(
    doc: &ConversationDocument,
    options: &ExportOptions,
) -> Result<String, serde_json::Error> {
    let html_snapshots = if options.include_html {
        let snapshots: Vec<String> =
            doc.messages.iter().filter_map(|m| m.html.clone()).collect();
        (!snapshots.is_empty()).then_some(snapshots)
    } else {
        None
    };

    let archive = ResearchArchive {
        archived_at: doc.metadata.exported_at,
        document: doc.clone(),
        analytics: analytics::analyze(doc),
        html_snapshots,
    };
    serde_json::to_string_pretty(&archive)
}
