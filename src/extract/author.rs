use scraper::{ElementRef, Selector};

use crate::models::Author;
use crate::platforms::SelectorConfig;

/// Role-bearing `data-*` attributes checked in priority order.
const ROLE_ATTRS: &[&str] = &["data-message-author-role", "data-role", "data-author"];

const USER_PREFIXES: &[&str] = &["You:", "User:", "Me:"];
const ASSISTANT_PREFIXES: &[&str] =
    &["Assistant:", "Claude:", "ChatGPT:", "Gemini:", "Perplexity:", "AI:"];

/// Determine which side of the conversation a turn element belongs to.
///
/// Priority: platform hook, marker-selector match on the element or a
/// descendant, `data-*` role attribute, literal text prefix, then the
/// assistant default.
pub fn resolve_author(element: ElementRef<'_>, config: &SelectorConfig) -> Author {
    if let Some(hint) = config.author_hint
        && let Some(author) = hint(&element.html())
    {
        return author;
    }

    if let Some(author) = marker_match(element, config) {
        return author;
    }

    if let Some(author) = role_attr_match(element) {
        return author;
    }

    if let Some(author) = text_prefix_match(element) {
        return author;
    }

    Author::Assistant
}

fn marker_match(element: ElementRef<'_>, config: &SelectorConfig) -> Option<Author> {
    for (markers, author) in [
        (config.user_markers, Author::User),
        (config.assistant_markers, Author::Assistant),
    ] {
        for marker in markers {
            let Ok(sel) = Selector::parse(marker) else {
                continue;
            };
            if sel.matches(&element) || element.select(&sel).next().is_some() {
                return Some(author);
            }
        }
    }
    None
}

fn role_attr_match(element: ElementRef<'_>) -> Option<Author> {
    for attr in ROLE_ATTRS {
        let Some(value) = element.value().attr(attr) else {
            continue;
        };
        let value = value.to_lowercase();
        if value.contains("user") || value.contains("human") {
            return Some(Author::User);
        }
        if value.contains("assistant") || value.contains("bot") || value.contains("ai") {
            return Some(Author::Assistant);
        }
    }
    None
}

fn text_prefix_match(element: ElementRef<'_>) -> Option<Author> {
    let text: String = element.text().collect::<String>().trim_start().chars().take(24).collect();
    if USER_PREFIXES.iter().any(|p| text.starts_with(p)) {
        return Some(Author::User);
    }
    if ASSISTANT_PREFIXES.iter().any(|p| text.starts_with(p)) {
        return Some(Author::Assistant);
    }
    None
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;
    use crate::platforms::config::{claude, generic};

    fn first_div(doc: &Html) -> ElementRef<'_> {
        let sel = Selector::parse("body > *").unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn test_marker_selector_on_element() {
        let doc = Html::parse_document(r#"<div data-testid="user-message">hi</div>"#);
        assert_eq!(resolve_author(first_div(&doc), &claude()), Author::User);
    }

    #[test]
    fn test_marker_selector_on_descendant() {
        let doc = Html::parse_document(
            r#"<div class="row"><div data-testid="assistant-message">hello</div></div>"#,
        );
        assert_eq!(resolve_author(first_div(&doc), &claude()), Author::Assistant);
    }

    #[test]
    fn test_role_attribute() {
        let doc = Html::parse_document(r#"<div data-message-author-role="user">hi</div>"#);
        // Generic config has no matching marker selectors for this shape
        // beyond data-role, so the attribute chain decides.
        assert_eq!(resolve_author(first_div(&doc), &generic()), Author::User);
    }

    #[test]
    fn test_text_prefix() {
        let doc = Html::parse_document("<div>You: what is recursion?</div>");
        assert_eq!(resolve_author(first_div(&doc), &generic()), Author::User);

        let doc = Html::parse_document("<div>Claude: recursion is...</div>");
        assert_eq!(resolve_author(first_div(&doc), &generic()), Author::Assistant);
    }

    #[test]
    fn test_default_is_assistant() {
        let doc = Html::parse_document("<div>unmarked content</div>");
        assert_eq!(resolve_author(first_div(&doc), &generic()), Author::Assistant);
    }

    #[test]
    fn test_hook_overrides_chain() {
        fn always_user(_html: &str) -> Option<Author> {
            Some(Author::User)
        }
        let mut config = generic();
        config.author_hint = Some(always_user);
        let doc = Html::parse_document(r#"<div class="assistant">hello</div>"#);
        assert_eq!(resolve_author(first_div(&doc), &config), Author::User);
    }
}
