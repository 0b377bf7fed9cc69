//! CLI output formatting.
//!
//! Output is page-centric: each resolved page leads with its position and
//! title, followed by its output file, indented by its depth in the tree.
//! The breadcrumb trail is shown as a context line below.
//!
//! ```text
//! Pages
//! 001 Home → ./index.html
//! 002 Docs → docs/index.html
//!     003 Intro → docs/intro/index.html
//!         Trail: Docs › Intro
//! ```
//!
//! While a run executes, [`format_build_event`] turns progress events into
//! lines, ending with the run summary:
//!
//! ```text
//! Structure en.json (2 top-level pages)
//!     Home → ./index.html
//! Resolved 3 pages from 1 structure (4 fragments cleared)
//! ```
//!
//! `format_*` functions are pure and return lines; `print_*` wrappers write
//! them to stdout.

use crate::builder::{BuildEvent, OutputFiles, RunSummary, SkipReason};
use crate::types::{BreadcrumbEntry, PageRecord};

const UNTITLED: &str = "(untitled)";

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn entry_title(entry: &BreadcrumbEntry) -> &str {
    entry.page_title.as_deref().unwrap_or(UNTITLED)
}

fn page_title(record: &PageRecord) -> &str {
    record
        .get("pageTitle")
        .and_then(|v| v.as_str())
        .unwrap_or(UNTITLED)
}

/// Breadcrumb as a single `A › B › C` line.
pub fn format_trail(breadcrumb: &[BreadcrumbEntry]) -> String {
    breadcrumb
        .iter()
        .map(entry_title)
        .collect::<Vec<_>>()
        .join(" › ")
}

/// One line per progress event, empty for events with nothing to show.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::StructureStarted { name, pages } => {
            vec![format!("Structure {} ({})", name, plural(*pages, "top-level page"))]
        }
        BuildEvent::StructureSkipped { name, reason } => {
            let why = match reason {
                SkipReason::NotJson => "not a structure file",
                SkipReason::NoData => "no data",
            };
            vec![format!("Skip {name}: {why}")]
        }
        BuildEvent::PageResolved {
            file_path,
            title,
            depth,
        } => vec![format!(
            "{}{} → {}",
            indent(*depth),
            title.as_deref().unwrap_or(UNTITLED),
            file_path
        )],
        BuildEvent::PageSkipped { .. } => Vec::new(),
        BuildEvent::Finished(summary) => vec![format_summary(summary)],
    }
}

pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Resolved {} from {} ({} cleared)",
        plural(summary.pages, "page"),
        plural(summary.documents, "structure"),
        plural(summary.fragments_cleared, "fragment"),
    )
}

/// Resolved pages in output-path order, indented by breadcrumb depth.
pub fn format_pages(output: &OutputFiles) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (pos, (file_path, record)) in output.iter().enumerate() {
        let breadcrumb = record.breadcrumb();
        let depth = breadcrumb.len().saturating_sub(1);
        lines.push(format!(
            "{}{} {} → {}",
            indent(depth),
            format_index(pos + 1),
            page_title(record),
            file_path
        ));
        if breadcrumb.len() > 1 {
            lines.push(format!(
                "{}Trail: {}",
                indent(depth + 1),
                format_trail(&breadcrumb)
            ));
        }
    }
    lines
}

pub fn print_pages(output: &OutputFiles) {
    for line in format_pages(output) {
        println!("{}", line);
    }
}
