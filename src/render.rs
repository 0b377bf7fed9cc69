//! Rendering the content directory into a [`FragmentStore`].
//!
//! This is the stage that runs before structure resolution: every markdown
//! file becomes an HTML fragment stored under its rendered name, so that a
//! structure file can reference `docs/intro.md` and find `docs/intro.html`.
//!
//! ```text
//! content/
//! ├── home.md            → "home.html"
//! ├── docs/intro.md      → "docs/intro.html"
//! ├── legal.html         → "legal.html" (stored verbatim)
//! └── media/logo.png     (ignored)
//! ```
//!
//! ## Front Matter
//!
//! A markdown file may start with a TOML block fenced by `+++` lines. Its
//! keys become fragment metadata and are hoisted together with `contents`:
//!
//! ```text
//! +++
//! author = "Kim"
//! +++
//! # Intro
//! ```
//!
//! Files are rendered in parallel; the store is assembled once all are done.

use crate::fragments::{FragmentRecord, FragmentStore};
use crate::structure::relative_name;
use pulldown_cmark::{Options, Parser, html as md_html};
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot read content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid front matter in {file}: {source}")]
    FrontMatter {
        file: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Front matter in {file} does not convert to JSON: {source}")]
    FrontMatterValue {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];
const FRONT_MATTER_FENCE: &str = "+++";

#[derive(Debug, Clone, Copy, PartialEq)]
enum SourceKind {
    Markdown,
    Html,
}

fn source_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if MARKDOWN_EXTENSIONS.contains(&ext.as_str()) {
        Some(SourceKind::Markdown)
    } else if ext == "html" {
        Some(SourceKind::Html)
    } else {
        None
    }
}

/// Render every markdown and HTML file below `root`.
///
/// A missing content directory yields an empty store: sites made only of
/// structure data are valid.
pub fn render_content(root: &Path) -> Result<FragmentStore, RenderError> {
    if !root.is_dir() {
        tracing::debug!(dir = %root.display(), "No content directory");
        return Ok(FragmentStore::new());
    }

    let mut sources: Vec<(PathBuf, SourceKind)> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(kind) = source_kind(entry.path()) {
            sources.push((entry.into_path(), kind));
        }
    }

    let rendered = sources
        .par_iter()
        .map(|(path, kind)| -> Result<(String, FragmentRecord), RenderError> {
            let name = relative_name(path, root);
            let text = fs::read_to_string(path)?;
            let record = match kind {
                SourceKind::Markdown => render_markdown(&name, &text)?,
                SourceKind::Html => FragmentRecord::new(text),
            };
            Ok((fragment_name(&name), record))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(fragments = rendered.len(), "Rendered content");
    Ok(rendered.into_iter().collect())
}

/// Render one markdown source, splitting off its front matter.
pub fn render_markdown(name: &str, source: &str) -> Result<FragmentRecord, RenderError> {
    let (front_matter, body) = split_front_matter(source);

    let metadata = match front_matter {
        Some(raw) => {
            let table: toml::Table =
                toml::from_str(raw).map_err(|source| RenderError::FrontMatter {
                    file: name.to_string(),
                    source,
                })?;
            match serde_json::to_value(table) {
                Ok(Value::Object(map)) => map,
                Ok(_) => Map::new(),
                Err(source) => {
                    return Err(RenderError::FrontMatterValue {
                        file: name.to_string(),
                        source,
                    });
                }
            }
        }
        None => Map::new(),
    };

    Ok(FragmentRecord {
        contents: markdown_to_html(body),
        metadata,
    })
}

pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

/// Split a leading `+++` fenced block from the body.
fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let Some(rest) = source
        .strip_prefix(FRONT_MATTER_FENCE)
        .and_then(|r| r.strip_prefix('\n').or_else(|| r.strip_prefix("\r\n")))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_FENCE {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    // Unterminated fence: treat the whole file as markdown.
    (None, source)
}

/// Store key of a source file: extension replaced by `.html`.
fn fragment_name(relative: &str) -> String {
    match relative.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && !stem.ends_with('/') => format!("{stem}.html"),
        _ => format!("{relative}.html"),
    }
}
