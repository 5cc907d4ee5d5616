//! JSON export: full structural dump honoring the include flags.

use serde_json::Value;

use crate::models::{ConversationDocument, ExportOptions};

/// Serialize the scoped document, stripping fields excluded by options.
pub fn render(doc: &ConversationDocument, options: &ExportOptions) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(doc)?;

    if let Value::Object(root) = &mut value {
        if !options.include_metadata {
            root.remove("metadata");
        }
        if !options.include_thinking {
            root.remove("thinkingBlocks");
        }
        if let Some(Value::Array(messages)) = root.get_mut("messages") {
            for message in messages.iter_mut() {
                let Value::Object(message) = message else { continue };
                if !options.include_thinking {
                    message.remove("thinkingBlocks");
                }
                if !options.include_html {
                    message.remove("html");
                }
            }
        }
    }

    serde_json::to_string_pretty(&value)
}
