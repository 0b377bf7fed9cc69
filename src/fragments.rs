//! The fragment store: rendered content keyed by normalized path.
//!
//! Fragments are produced upstream (see [`crate::render`]) and looked up by the
//! resolver when a page references them through a `content` field:
//!
//! ```text
//! "content": "docs/intro.md"   →   fragments["docs/intro.html"]
//! ```
//!
//! The extension of the referenced file is irrelevant: markdown sources are
//! stored under their rendered `.html` name.

use crate::types::CONTENTS_KEY;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Placeholder the Prose editor prefixes image URLs with. Media is published
/// under the site root, so the prefix is dropped.
pub const BASE_URL_PLACEHOLDER: &str = "{{site.baseurl}}";

/// A rendered content fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    /// Rendered HTML body.
    pub contents: String,
    /// Front-matter fields of the source file.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl FragmentRecord {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            metadata: Map::new(),
        }
    }

    /// The fragment as it is spliced into a page: base-url placeholders
    /// removed, metadata alongside `contents`.
    pub fn resolved_fields(&self) -> Map<String, Value> {
        let mut fields = self.metadata.clone();
        fields.insert(
            CONTENTS_KEY.to_string(),
            Value::String(strip_base_url(&self.contents)),
        );
        fields
    }
}

/// Remove every `{{site.baseurl}}` occurrence from rendered content.
pub fn strip_base_url(contents: &str) -> String {
    contents.replace(BASE_URL_PLACEHOLDER, "")
}

/// Drop the extension of a content path, keeping its directory prefix.
///
/// - `"about.md"` → `"about"`
/// - `"docs/guide/intro.md"` → `"docs/guide/intro"`
/// - `"notes"` → `"notes"`
pub fn normalize_content_path(content_path: &str) -> String {
    let path = Path::new(content_path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.parent().map(|p| p.to_string_lossy()) {
        Some(dir) if !dir.is_empty() => {
            format!("{}/{}", dir.trim_end_matches('/'), stem)
        }
        _ => stem,
    }
}

/// Store key for a content path: normalized path plus `.html`.
pub fn fragment_key(content_path: &str) -> String {
    format!("{}.html", normalize_content_path(content_path))
}

/// Rendered fragments keyed by `<normalized path>.html`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentStore {
    entries: BTreeMap<String, FragmentRecord>,
}

impl FragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fragment under an exact store key (e.g. `"about.html"`).
    pub fn insert(&mut self, key: impl Into<String>, record: FragmentRecord) {
        self.entries.insert(key.into(), record);
    }

    pub fn get(&self, key: &str) -> Option<&FragmentRecord> {
        self.entries.get(key)
    }

    /// Find the fragment a `content` reference points at.
    pub fn lookup(&self, content_path: &str) -> Option<&FragmentRecord> {
        self.get(&fragment_key(content_path))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}

impl FromIterator<(String, FragmentRecord)> for FragmentStore {
    fn from_iter<I: IntoIterator<Item = (String, FragmentRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_extension() {
        assert_eq!(normalize_content_path("about.md"), "about");
        assert_eq!(normalize_content_path("notes"), "notes");
    }

    #[test]
    fn normalize_keeps_directory() {
        assert_eq!(
            normalize_content_path("docs/guide/intro.md"),
            "docs/guide/intro"
        );
    }

    #[test]
    fn normalize_only_drops_last_extension() {
        assert_eq!(normalize_content_path("a/release.v2.md"), "a/release.v2");
    }

    #[test]
    fn fragment_key_appends_html() {
        assert_eq!(fragment_key("docs/intro.md"), "docs/intro.html");
        assert_eq!(fragment_key("docs/intro.html"), "docs/intro.html");
    }

    #[test]
    fn strip_base_url_removes_every_occurrence() {
        let html = r#"<img src="{{site.baseurl}}/a.png"><img src="{{site.baseurl}}/b.png">"#;
        assert_eq!(
            strip_base_url(html),
            r#"<img src="/a.png"><img src="/b.png">"#
        );
    }

    #[test]
    fn resolved_fields_merge_metadata_and_contents() {
        let mut record = FragmentRecord::new(r#"<img src="{{site.baseurl}}/x.png">"#);
        record
            .metadata
            .insert("title".into(), Value::String("Intro".into()));

        let fields = record.resolved_fields();
        assert_eq!(fields["title"], "Intro");
        assert_eq!(fields["contents"], r#"<img src="/x.png">"#);
    }

    #[test]
    fn lookup_uses_normalized_key() {
        let mut store = FragmentStore::new();
        store.insert("docs/intro.html", FragmentRecord::new("<p>hi</p>"));

        assert!(store.lookup("docs/intro.md").is_some());
        assert!(store.lookup("intro.md").is_none());
    }

    #[test]
    fn clear_reports_count() {
        let mut store: FragmentStore = [
            ("a.html".to_string(), FragmentRecord::new("a")),
            ("b.html".to_string(), FragmentRecord::new("b")),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn record_serializes_flat() {
        let mut record = FragmentRecord::new("<p>x</p>");
        record.metadata.insert("author".into(), Value::from("kim"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"contents": "<p>x</p>", "author": "kim"}));
    }
}
