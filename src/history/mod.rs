//! Bounded export-history log, persisted as JSON in the platform data
//! directory. Read-modify-write, last write wins; a corrupt or missing file
//! reads as an empty history.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::export::Artifact;
use crate::models::ExportFormat;

/// Most recent entries kept on disk.
pub const HISTORY_CAP: usize = 20;

const APP_DIR: &str = "ai-chat-exporter";
const HISTORY_FILE: &str = "export_history.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub filename: String,
    pub bytes: usize,
    pub format: ExportFormat,
    pub platform: String,
    pub scope: String,
    pub exported_at: DateTime<Utc>,
}

impl ExportRecord {
    pub fn from_artifact(
        artifact: &Artifact,
        format: ExportFormat,
        platform: &str,
        scope: &str,
    ) -> Self {
        ExportRecord {
            filename: artifact.filename.clone(),
            bytes: artifact.bytes.len(),
            format,
            platform: platform.to_string(),
            scope: scope.to_string(),
            exported_at: Utc::now(),
        }
    }
}

/// Default history location under the platform data dir, when one exists.
pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(HISTORY_FILE))
}

/// Load history, newest first. Missing and unreadable files are an empty
/// history, not an error.
pub fn load(path: &Path) -> Vec<ExportRecord> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "discarding corrupt export history");
            Vec::new()
        }
    }
}

/// Prepend a record and persist, truncating to [`HISTORY_CAP`].
pub fn append(path: &Path, record: ExportRecord) -> io::Result<Vec<ExportRecord>> {
    let mut records = load(path);
    records.insert(0, record);
    records.truncate(HISTORY_CAP);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&records)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    fs::write(path, json)?;
    Ok(records)
}
