//! Filename templating: token substitution followed by sanitization.

use crate::models::{ConversationDocument, ExportFormat, ExportOptions};
use crate::utils::sanitize_filename;

const DEFAULT_TEMPLATE: &str = "{base}_{platform}_{date}_{scope}";

/// Build the artifact filename for one export. Tokens: `{base}` `{platform}`
/// `{date}` `{time}` `{scope}`. The extension comes from the format and is
/// never templated.
pub fn build_filename(
    doc: &ConversationDocument,
    format: ExportFormat,
    options: &ExportOptions,
) -> String {
    let base = options
        .filename
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| doc.metadata.title.clone());

    let template = options.filename_template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    let stem = template
        .replace("{base}", &base)
        .replace("{platform}", &doc.metadata.platform)
        .replace("{date}", &doc.metadata.exported_at.format("%Y-%m-%d").to_string())
        .replace("{time}", &doc.metadata.exported_at.format("%H%M%S").to_string())
        .replace("{scope}", &doc.metadata.scope);

    let mut stem = sanitize_filename(&stem);
    if stem.is_empty() {
        stem = "conversation".to_string();
    }
    format!("{stem}.{}", format.extension())
}
