//! # Page Builder
//!
//! Turns hierarchical page-structure descriptions into a flat map of output
//! file paths to resolved page records, ready for a template stage.
//!
//! # Pipeline
//!
//! ```text
//! 1. Render    content/    →  FragmentStore   (markdown → HTML fragments)
//! 2. Load      structure/  →  StructureFiles  (*.json → page trees)
//! 3. Resolve   trees + fragments → path → PageRecord
//! ```
//!
//! A structure file describes a page tree plus data shared by every page:
//!
//! ```json
//! { "data": {
//!     "globalData": { "footer": { "content": "footer.md", "hoist": true } },
//!     "pages": [
//!       { "path": "", "data": { "pageTitle": "Home", "intro": { "content": "home.md" } },
//!         "children": [
//!           { "path": "about", "data": { "pageTitle": "About" } }
//!         ] }
//!     ] } }
//! ```
//!
//! Resolution gives every page a directory path (`about/`), an output file
//! (`about/index.html`) and a breadcrumb trail, replaces `content` references
//! with the rendered fragments, merges the global data in, and hoists the
//! page's `data` keys onto the record. After a successful run the fragment
//! store is emptied: the template stage only sees page records.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`builder`] | Runs a full resolution; all-or-nothing merge into the output set |
//! | [`flatten`] | Recursive tree walk producing page records |
//! | [`content`] | Content-reference classification and resolution |
//! | [`path`] | Output directory path construction |
//! | [`fragments`] | The fragment store and content-path normalization |
//! | [`structure`] | Loading structure files from disk |
//! | [`render`] | Rendering markdown content into fragments |
//! | [`types`] | Structure document and page record types |
//! | [`config`] | `page-builder.toml` loading and validation |
//! | [`output`] | CLI output formatting |

pub mod builder;
pub mod config;
pub mod content;
pub mod flatten;
pub mod fragments;
pub mod output;
pub mod path;
pub mod render;
pub mod structure;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
