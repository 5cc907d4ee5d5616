//! Signed export manifest: SHA-256 of the artifact bytes plus context,
//! emitted as a sibling JSON file. Tamper evidence, not encryption.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestContext {
    pub platform: String,
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub generated_at: DateTime<Utc>,
    pub exporter_version: String,
    pub file: ManifestFile,
    pub context: ManifestContext,
}

impl ExportManifest {
    pub fn for_artifact(
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
        platform: &str,
        scope: &str,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();

        ExportManifest {
            generated_at: Utc::now(),
            exporter_version: env!("CARGO_PKG_VERSION").to_string(),
            file: ManifestFile {
                name: filename.to_string(),
                mime_type: mime_type.to_string(),
                bytes: bytes.len(),
                sha256: format!("{digest:x}"),
            },
            context: ManifestContext {
                platform: platform.to_string(),
                scope: scope.to_string(),
            },
        }
    }

    /// Sibling filename: `<artifact>.manifest.json`.
    pub fn filename(artifact_name: &str) -> String {
        format!("{artifact_name}.manifest.json")
    }
}
