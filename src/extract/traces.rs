//! Trace-region discovery within a turn element.
//!
//! The live-DOM capture this format comes from has to click open collapsed
//! disclosure widgets; in a parsed snapshot the collapsed markup is already
//! present, so discovery is an ordered list of strategies evaluated
//! short-circuit: native `<details>` regions, toggle-class containers, then
//! `aria-expanded` containers. One strategy finding nothing (or a selector
//! failing to parse) never aborts the batch; a region we cannot shape cleanly
//! degrades to whatever text is visible.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::debug;

/// A raw trace region before classification.
#[derive(Debug, Clone)]
pub struct TraceRegion<'a> {
    /// Collapsed-toggle label, empty when the region has none.
    pub summary: String,
    /// Visible text of the region, minus the summary label.
    pub content: String,
    /// Inner markup, used as the rich hint for classification.
    pub inner_html: String,
    /// The region element, kept for per-block reference harvesting.
    pub element: ElementRef<'a>,
}

type Strategy = for<'a> fn(ElementRef<'a>) -> Vec<TraceRegion<'a>>;

/// Ordered discovery strategies; the first one that yields regions wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("details", details_strategy),
    ("toggle-class", toggle_class_strategy),
    ("aria-expanded", aria_strategy),
];

static DETAILS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("details").expect("valid details selector"));
static SUMMARY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("summary").expect("valid summary selector"));

/// Discover trace regions inside a turn element.
pub fn discover_trace_regions(element: ElementRef<'_>) -> Vec<TraceRegion<'_>> {
    for (name, strategy) in STRATEGIES {
        let regions = strategy(element);
        if !regions.is_empty() {
            debug!(strategy = name, count = regions.len(), "trace regions discovered");
            return drop_nested(regions);
        }
    }
    Vec::new()
}

/// Keep only outermost regions: a region nested inside another discovered
/// region duplicates its parent's text.
fn drop_nested<'a>(regions: Vec<TraceRegion<'a>>) -> Vec<TraceRegion<'a>> {
    let ids: Vec<_> = regions.iter().map(|r| r.element.id()).collect();
    regions
        .into_iter()
        .filter(|r| {
            !r.element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|anc| ids.contains(&anc.id()))
        })
        .collect()
}

fn details_strategy(element: ElementRef<'_>) -> Vec<TraceRegion<'_>> {
    element.select(&DETAILS_SEL).map(region_from_disclosure).collect()
}

fn toggle_class_strategy(element: ElementRef<'_>) -> Vec<TraceRegion<'_>> {
    let Ok(sel) = Selector::parse(
        "[class*=\"thinking\"], [class*=\"collapsible\"], [class*=\"trace\"], [class*=\"accordion\"]",
    ) else {
        return Vec::new();
    };
    element.select(&sel).map(region_from_disclosure).collect()
}

fn aria_strategy(element: ElementRef<'_>) -> Vec<TraceRegion<'_>> {
    let Ok(sel) = Selector::parse("[aria-expanded]") else {
        return Vec::new();
    };
    element
        .select(&sel)
        .map(|node| {
            let content = node.text().collect::<String>().trim().to_string();
            let summary = node
                .value()
                .attr("aria-label")
                .map(str::to_string)
                .unwrap_or_else(|| content.lines().next().unwrap_or("").trim().to_string());
            TraceRegion {
                summary,
                content,
                inner_html: node.inner_html(),
                element: node,
            }
        })
        .collect()
}

/// Shape a disclosure-style region: toggle label becomes the summary, the
/// rest of the visible text becomes the content.
fn region_from_disclosure(node: ElementRef<'_>) -> TraceRegion<'_> {
    let summary = node
        .select(&SUMMARY_SEL)
        .next()
        .map(|s| s.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let full_text = node.text().collect::<String>().trim().to_string();
    let content = if !summary.is_empty() {
        full_text.strip_prefix(summary.as_str()).unwrap_or(&full_text).trim().to_string()
    } else {
        full_text
    };

    TraceRegion { summary, content, inner_html: node.inner_html(), element: node }
}
