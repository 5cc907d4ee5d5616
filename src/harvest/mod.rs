//! Reference harvester: links, attachments, documents and citations from a
//! DOM subtree.
//!
//! Pure function of the subtree: no side effects, and a malformed URL drops
//! the candidate rather than failing the harvest.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

use crate::models::{Attachment, Citation, Link, ReferenceSet};
use crate::platforms::SelectorConfig;

/// Extensions classified as document files. Anything else stays a plain link.
pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "md", "rtf", "odt", "csv", "tsv", "xls", "xlsx", "ppt", "pptx",
    "json", "xml", "yaml", "yml",
];

/// Bare URLs rendered as text without a real anchor tag.
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("valid bare-url regex"));

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Extract the document-file extension of a URL path or filename, if any.
pub fn document_extension(name_or_url: &str) -> Option<&'static str> {
    let path = name_or_url.split(['?', '#']).next().unwrap_or(name_or_url);
    let ext = path.rsplit('.').next()?.to_ascii_lowercase();
    DOCUMENT_EXTENSIONS.iter().find(|e| **e == ext).copied()
}

/// Harvest every reference in the subtree rooted at `element`.
///
/// Anchors are resolved against `base_url` when present; candidates whose
/// URL cannot be parsed are silently dropped. The rendered text is also
/// regex-scanned for bare `https?://` URLs that platforms render without
/// `<a>` tags. All four output lists are deduplicated before return.
pub fn extract_references(
    element: ElementRef<'_>,
    base_url: Option<&Url>,
    config: &SelectorConfig,
) -> ReferenceSet {
    let mut set = ReferenceSet::default();

    harvest_anchors(element, base_url, &mut set);
    harvest_attachments(element, config, &mut set);
    harvest_citations(element, config, &mut set);
    harvest_bare_urls(element, &mut set);

    set.dedup();
    set
}

fn resolve(href: &str, base_url: Option<&Url>) -> Option<Url> {
    if href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    match base_url {
        Some(base) => base.join(href).ok(),
        None => Url::parse(href).ok(),
    }
}

fn harvest_anchors(element: ElementRef<'_>, base_url: Option<&Url>, set: &mut ReferenceSet) {
    for anchor in element.select(&ANCHOR_SEL) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve(href, base_url) else {
            continue;
        };

        let text = anchor.text().collect::<String>().trim().to_string();
        let title = if text.is_empty() { url.to_string() } else { text };

        if let Some(ext) = document_extension(url.path()) {
            let name = url
                .path_segments()
                .and_then(|mut s| s.next_back())
                .filter(|s| !s.is_empty())
                .unwrap_or(title.as_str())
                .to_string();
            set.documents.push(Attachment {
                name,
                url: Some(url.to_string()),
                file_type: ext.to_string(),
            });
        } else {
            let domain = url.host_str().map(str::to_string);
            set.links.push(Link { url: url.to_string(), title, domain });
        }
    }
}

fn harvest_attachments(element: ElementRef<'_>, config: &SelectorConfig, set: &mut ReferenceSet) {
    let Ok(sel) = Selector::parse(config.attachments) else {
        return;
    };
    for node in element.select(&sel) {
        let name = node
            .value()
            .attr("data-file-name")
            .or_else(|| node.value().attr("data-filename"))
            .or_else(|| node.value().attr("title"))
            .map(str::to_string)
            .unwrap_or_else(|| node.text().collect::<String>().trim().to_string());
        if name.is_empty() {
            continue;
        }
        let url = node.value().attr("href").or_else(|| node.value().attr("data-url"));
        let file_type = document_extension(&name).unwrap_or("file").to_string();
        set.attachments.push(Attachment {
            name,
            url: url.map(str::to_string),
            file_type,
        });
    }
}

fn harvest_citations(element: ElementRef<'_>, config: &SelectorConfig, set: &mut ReferenceSet) {
    let Ok(sel) = Selector::parse(config.citations) else {
        return;
    };
    for node in element.select(&sel) {
        let text = node.text().collect::<String>().trim().to_string();
        if text.is_empty() {
            continue;
        }
        let url = node
            .value()
            .attr("href")
            .map(str::to_string)
            .or_else(|| {
                node.select(&ANCHOR_SEL)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string)
            });
        set.citations.push(Citation { text, url });
    }
}

/// Defense against platforms that render link text without real anchors.
fn harvest_bare_urls(element: ElementRef<'_>, set: &mut ReferenceSet) {
    let text = element.text().collect::<String>();
    for m in BARE_URL_RE.find_iter(&text) {
        let raw = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
        let Some(url) = Url::parse(raw).ok() else {
            continue;
        };
        if let Some(ext) = document_extension(url.path()) {
            let name = url
                .path_segments()
                .and_then(|mut s| s.next_back())
                .filter(|s| !s.is_empty())
                .unwrap_or(raw)
                .to_string();
            set.documents.push(Attachment {
                name,
                url: Some(url.to_string()),
                file_type: ext.to_string(),
            });
        } else {
            let domain = url.host_str().map(str::to_string);
            set.links.push(Link { url: url.to_string(), title: raw.to_string(), domain });
        }
    }
}
