use serde::{Deserialize, Serialize};

/// A plain hyperlink discovered in a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// An attachment or document file discovered in a turn.
///
/// The same shape serves both `attachments` (anything file-like) and
/// `documents` (the subset recognized as document files by extension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub file_type: String,
}

/// A citation marker, typically rendered footnote-style by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Links, attachments, documents and citations harvested from a DOM subtree.
///
/// Merging is concatenation followed by signature dedup, which makes it
/// associative and idempotent: merging a set with itself is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSet {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub documents: Vec<Attachment>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl ReferenceSet {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
            && self.attachments.is_empty()
            && self.documents.is_empty()
            && self.citations.is_empty()
    }

    /// Total number of entries across all four lists.
    pub fn len(&self) -> usize {
        self.links.len() + self.attachments.len() + self.documents.len() + self.citations.len()
    }

    /// Remove duplicates from each list, keeping first occurrence order.
    pub fn dedup(&mut self) {
        dedup_by_key(&mut self.links, |l| format!("{}|{}|{:?}", l.url, l.title, l.domain));
        dedup_by_key(&mut self.attachments, |a| {
            format!("{}|{:?}|{}", a.name, a.url, a.file_type)
        });
        dedup_by_key(&mut self.documents, |d| format!("{}|{:?}|{}", d.name, d.url, d.file_type));
        dedup_by_key(&mut self.citations, |c| format!("{}|{:?}", c.text, c.url));
    }

    /// Merge `other` into `self` by concatenation plus dedup.
    pub fn merge(&mut self, other: &ReferenceSet) {
        self.links.extend(other.links.iter().cloned());
        self.attachments.extend(other.attachments.iter().cloned());
        self.documents.extend(other.documents.iter().cloned());
        self.citations.extend(other.citations.iter().cloned());
        self.dedup();
    }

    /// `Some(self)` if non-empty, `None` otherwise. Messages only carry a
    /// reference set when there is something in it.
    pub fn into_option(mut self) -> Option<ReferenceSet> {
        self.dedup();
        if self.is_empty() { None } else { Some(self) }
    }
}

/// Stable in-place dedup keyed by a composite signature.
fn dedup_by_key<T, F: Fn(&T) -> String>(items: &mut Vec<T>, key: F) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(key(item)));
}
