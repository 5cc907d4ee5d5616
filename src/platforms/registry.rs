use scraper::{Html, Selector};
use tracing::warn;

use super::config::{self, SelectorConfig};

/// Explicit, ordered platform registry constructed at startup.
///
/// Detection walks registration order; `generic` is always registered last so
/// it can never shadow a specific platform. When more than one specific
/// platform matches the same page, the first registered wins and a warning
/// names both.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    entries: Vec<SelectorConfig>,
}

impl PlatformRegistry {
    /// Registry with the built-in platform set.
    pub fn builtin() -> Self {
        let mut registry = PlatformRegistry { entries: Vec::new() };
        registry.register(config::claude());
        registry.register(config::chatgpt());
        registry.register(config::gemini());
        registry.register(config::perplexity());
        registry.register(config::generic());
        registry
    }

    /// Register a platform. Re-registering an id replaces the earlier entry
    /// in place, preserving its detection precedence.
    pub fn register(&mut self, config: SelectorConfig) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.platform == config.platform) {
            *existing = config;
        } else {
            self.entries.push(config);
        }
    }

    pub fn get(&self, platform: &str) -> Option<&SelectorConfig> {
        self.entries.iter().find(|e| e.platform == platform)
    }

    pub fn platform_ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.platform).collect()
    }

    /// Detect which platform a parsed page belongs to.
    ///
    /// A platform matches when one of its conversation-container candidates
    /// matches *and* that container holds at least one message-shaped
    /// element. Falls back to `generic` (if registered), else `None`.
    pub fn detect(&self, html: &Html) -> Option<&SelectorConfig> {
        let mut matched: Vec<&SelectorConfig> = Vec::new();

        for entry in &self.entries {
            if entry.platform == "generic" {
                continue;
            }
            if Self::config_matches(entry, html) {
                matched.push(entry);
            }
        }

        match matched.len() {
            0 => self.get("generic"),
            1 => Some(matched[0]),
            _ => {
                // Ambiguous precedence is undocumented upstream; take
                // registration order, loudly.
                warn!(
                    chosen = matched[0].platform,
                    also_matched = matched[1].platform,
                    "multiple platform selector sets matched; using registration order"
                );
                Some(matched[0])
            }
        }
    }

    fn config_matches(config: &SelectorConfig, html: &Html) -> bool {
        let Ok(message_sel) = Selector::parse(config.messages) else {
            return false;
        };
        for candidate in config.conversation {
            // A selector that fails to parse is "no match", never an error.
            let Ok(container_sel) = Selector::parse(candidate) else {
                continue;
            };
            if let Some(container) = html.select(&container_sel).next()
                && container.select(&message_sel).next().is_some()
            {
                return true;
            }
        }
        false
    }
}
