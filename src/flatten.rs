//! Flattening the page tree into output records.
//!
//! The tree is walked pre-order. Every page gets a directory path built from
//! its ancestors and a breadcrumb trail; pages carrying `data` become a
//! [`PageRecord`] stored under `path + output`:
//!
//! ```text
//! pages:                          results:
//! ├── "" (Home)                   ./index.html         breadcrumb: Home
//! └── "docs" (no data)            (grouping only, no record)
//!     ├── "intro" (Intro)         docs/intro/index.html  breadcrumb: -, Intro
//!     └── "api" output=ref.html   docs/api/ref.html      breadcrumb: -, API
//! ```
//!
//! Record fields are layered in a fixed order, later layers winning:
//! the page's own keys and stamp, then `globalData`, then the breadcrumb, then
//! every resolved `data` key, then an empty `contents` body.

use crate::builder::BuildEvent;
use crate::content::ResolveError;
use crate::fragments::FragmentStore;
use crate::path::build_path;
use crate::types::{BreadcrumbEntry, CONTENTS_KEY, PageNode, PageRecord};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;
use std::time::{SystemTime, UNIX_EPOCH};

/// Resolved pages keyed by output file path.
pub type ResultsMap = BTreeMap<String, PageRecord>;

/// Version and build time stamped on every record.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub version: String,
    /// Whole seconds since the Unix epoch.
    pub timestamp: u64,
}

impl Stamp {
    pub fn now() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
        }
    }
}

/// What a page passes down to its children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentContext {
    pub path: String,
    pub breadcrumb: Vec<BreadcrumbEntry>,
}

impl ParentContext {
    /// The synthetic parent of a structure document's top-level pages.
    pub fn root() -> Self {
        Self::default()
    }
}

/// Walks one structure document's pages with its resolved global data.
pub struct Flattener<'a> {
    global_data: &'a Map<String, Value>,
    fragments: &'a FragmentStore,
    stamp: &'a Stamp,
    events: Option<&'a Sender<BuildEvent>>,
}

impl<'a> Flattener<'a> {
    pub fn new(
        global_data: &'a Map<String, Value>,
        fragments: &'a FragmentStore,
        stamp: &'a Stamp,
    ) -> Self {
        Self {
            global_data,
            fragments,
            stamp,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Option<&'a Sender<BuildEvent>>) -> Self {
        self.events = events;
        self
    }

    /// Flatten `pages` (and their descendants) into `results`.
    ///
    /// A later page whose file path collides with an earlier one replaces it.
    pub fn flatten(
        &self,
        pages: &[PageNode],
        parent: &ParentContext,
        results: &mut ResultsMap,
    ) -> Result<(), ResolveError> {
        for page in pages {
            let path = build_path(page.path.as_deref(), &parent.path);
            let file_path = format!("{}{}", path, page.output_name());

            let mut breadcrumb = parent.breadcrumb.clone();
            breadcrumb.push(BreadcrumbEntry {
                page_title: page.page_title().map(str::to_string),
                link: format!("/{path}"),
            });

            tracing::debug!(page = %file_path, "Flattening page");
            match self.inflate(page, &path, &breadcrumb)? {
                Some(record) => {
                    self.emit(BuildEvent::PageResolved {
                        file_path: file_path.clone(),
                        title: page.page_title().map(str::to_string),
                        depth: breadcrumb.len(),
                    });
                    if results.insert(file_path.clone(), record).is_some() {
                        tracing::warn!(page = %file_path, "Output path collision, keeping the later page");
                    }
                }
                None => self.emit(BuildEvent::PageSkipped {
                    file_path: file_path.clone(),
                }),
            }

            if let Some(children) = &page.children {
                let context = ParentContext { path, breadcrumb };
                self.flatten(children, &context, results)?;
            }
        }
        Ok(())
    }

    /// Build the record for one page, or `None` for pages without `data`.
    fn inflate(
        &self,
        page: &PageNode,
        path: &str,
        breadcrumb: &[BreadcrumbEntry],
    ) -> Result<Option<PageRecord>, ResolveError> {
        let Some(data) = &page.data else {
            return Ok(None);
        };

        let mut fields = page.extra.clone();
        fields.insert("path".to_string(), Value::from(path));
        if let Some(output) = &page.output {
            fields.insert("output".to_string(), Value::from(output.as_str()));
        }
        fields.insert(
            "version".to_string(),
            Value::from(self.stamp.version.as_str()),
        );
        fields.insert("timestamp".to_string(), Value::from(self.stamp.timestamp));

        fields.extend(self.global_data.clone());

        fields.insert(
            "breadcrumb".to_string(),
            serde_json::to_value(breadcrumb).unwrap_or_default(),
        );

        for (key, block) in data.iter() {
            fields.insert(key.to_string(), block.resolve(self.fragments)?);
        }

        // The template stage skips records whose body is missing.
        fields.insert(CONTENTS_KEY.to_string(), Value::String(String::new()));

        Ok(Some(PageRecord::new(fields)))
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(tx) = self.events {
            let _ = tx.send(event);
        }
    }
}
