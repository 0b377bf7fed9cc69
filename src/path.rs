//! Output path construction for pages.
//!
//! Page paths are directories relative to the build root and always end in a
//! single `/`, so a page's output file is simply `path + output`:
//!
//! ```text
//! parent ""       + "docs"   →  "docs/"
//! parent "docs/"  + "guide"  →  "docs/guide/"
//! parent "docs/"  + (none)   →  "docs/"
//! parent ""       + (none)   →  "./"
//! ```

/// Join a page's own segment onto its parent's path.
pub fn build_path(segment: Option<&str>, parent_path: &str) -> String {
    let joined = format!("{}{}", parent_path, segment.unwrap_or_default());
    if joined.is_empty() {
        "./".to_string()
    } else if joined.ends_with('/') {
        joined
    } else {
        joined + "/"
    }
}
