//! Shared types for structure documents and the page records produced from them.
//!
//! Structure documents are deserialized once by the loader; content blocks are
//! classified at that point (see [`ContentBlock`]) so the resolver never has to
//! re-inspect raw JSON while walking the tree.

use crate::content::ContentBlock;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Key on page records holding the body handed to the template stage.
pub const CONTENTS_KEY: &str = "contents";

/// Output file name used when a page does not set `output`.
pub const DEFAULT_OUTPUT: &str = "index.html";

/// One parsed structure-description file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructureDocument {
    /// Documents without `data` are skipped by the builder.
    #[serde(default)]
    pub data: Option<StructureData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureData {
    /// Shared data merged into every page of this document.
    #[serde(default)]
    pub global_data: Option<DataBlocks>,
    #[serde(default)]
    pub pages: Vec<PageNode>,
}

/// A node of the page tree as written in a structure file.
///
/// Keys other than the four known ones are kept in `extra` and carried onto
/// the emitted record verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageNode {
    /// Path segment relative to the parent page. May be empty.
    #[serde(default)]
    pub path: Option<String>,
    /// Output file name inside the page directory.
    #[serde(default)]
    pub output: Option<String>,
    /// Page content and metadata. Pages without it produce no record.
    #[serde(default)]
    pub data: Option<DataBlocks>,
    #[serde(default)]
    pub children: Option<Vec<PageNode>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageNode {
    /// Output file name, falling back to [`DEFAULT_OUTPUT`] when unset or empty.
    pub fn output_name(&self) -> &str {
        match self.output.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_OUTPUT,
        }
    }

    /// Title used for this page's breadcrumb entry (`data.pageTitle`).
    pub fn page_title(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.get("pageTitle"))
            .and_then(ContentBlock::as_str)
    }
}

/// Ordered `name → block` mapping used for both page `data` and `globalData`.
///
/// Keys keep the order of the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataBlocks(Vec<(String, ContentBlock)>);

impl DataBlocks {
    pub fn get(&self, key: &str) -> Option<&ContentBlock> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, block)| block)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentBlock)> {
        self.0.iter().map(|(k, block)| (k.as_str(), block))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for DataBlocks {
    fn from(map: Map<String, Value>) -> Self {
        Self(
            map.into_iter()
                .map(|(key, value)| (key, ContentBlock::from(value)))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for DataBlocks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}

/// One step of a page's breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    /// Site-absolute link: `"/"` followed by the page path.
    pub link: String,
}

/// A fully resolved page, ready for the template stage.
///
/// Stored as an ordered JSON object because hoisted `data` keys are free-form;
/// accessors cover the fields every record is guaranteed to have.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageRecord(Map<String, Value>);

impl PageRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn path(&self) -> Option<&str> {
        self.get("path").and_then(Value::as_str)
    }

    pub fn contents(&self) -> Option<&str> {
        self.get(CONTENTS_KEY).and_then(Value::as_str)
    }

    /// Breadcrumb trail, or an empty list if the field is missing or malformed.
    pub fn breadcrumb(&self) -> Vec<BreadcrumbEntry> {
        self.get("breadcrumb")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_structure_document() {
        let json = r#"{
            "data": {
                "globalData": {"footer": {"content": "footer.md"}},
                "pages": [
                    {"path": "about", "template": "page.html", "data": {"pageTitle": "About"}},
                    {"children": [{"path": "deep"}]}
                ]
            }
        }"#;
        let doc: StructureDocument = serde_json::from_str(json).unwrap();
        let data = doc.data.unwrap();

        assert_eq!(data.global_data.as_ref().unwrap().len(), 1);
        assert_eq!(data.pages.len(), 2);
        assert_eq!(data.pages[0].path.as_deref(), Some("about"));
        assert_eq!(data.pages[0].extra["template"], "page.html");
        assert!(!data.pages[0].extra.contains_key("data"));
        assert!(data.pages[1].data.is_none());
        assert_eq!(data.pages[1].children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn document_without_data_parses() {
        let doc: StructureDocument = serde_json::from_str(r#"{"meta": 1}"#).unwrap();
        assert!(doc.data.is_none());
    }

    #[test]
    fn missing_pages_is_empty() {
        let doc: StructureDocument = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(doc.data.unwrap().pages.is_empty());
    }

    #[test]
    fn output_name_defaults_when_unset_or_empty() {
        let mut page = PageNode::default();
        assert_eq!(page.output_name(), "index.html");
        page.output = Some(String::new());
        assert_eq!(page.output_name(), "index.html");
        page.output = Some("feed.xml".into());
        assert_eq!(page.output_name(), "feed.xml");
    }

    #[test]
    fn page_title_only_from_plain_strings() {
        let page: PageNode =
            serde_json::from_str(r#"{"data": {"pageTitle": "Home"}}"#).unwrap();
        assert_eq!(page.page_title(), Some("Home"));

        let page: PageNode =
            serde_json::from_str(r#"{"data": {"pageTitle": {"content": "t.md"}}}"#).unwrap();
        assert_eq!(page.page_title(), None);
    }

    #[test]
    fn data_blocks_keep_source_order() {
        let page: PageNode =
            serde_json::from_str(r#"{"data": {"z": 1, "a": 2, "m": 3}}"#).unwrap();
        let data = page.data.unwrap();
        let keys: Vec<&str> = data.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn breadcrumb_entry_omits_missing_title() {
        let entry = BreadcrumbEntry {
            page_title: None,
            link: "/a/".into(),
        };
        assert_eq!(serde_json::to_string(&entry).unwrap(), r#"{"link":"/a/"}"#);
    }
}
