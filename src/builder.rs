//! Running a full structure resolution.
//!
//! [`PageBuilder::run`] takes the loaded structure entries and the fragment
//! store, and either succeeds completely or changes nothing:
//!
//! ```text
//! for each entry (path order):
//!     not .json          → skipped
//!     no "data"          → skipped
//!     otherwise          → resolve globalData, flatten pages → results
//! success:  fragments cleared, results merged into the output set
//! failure:  error returned, fragments and output untouched
//! ```
//!
//! Results from all documents share one map, so two locales writing the same
//! output path resolve to whichever document comes last.

use crate::config::BuilderConfig;
use crate::content::{ResolveError, resolve_global_data};
use crate::flatten::{Flattener, ParentContext, ResultsMap, Stamp};
use crate::fragments::FragmentStore;
use crate::structure::{LoadError, StructureFile, StructureFiles, load_structures};
use crate::types::PageRecord;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// The caller's file set that resolved pages are merged into.
pub type OutputFiles = BTreeMap<String, PageRecord>;

/// Why a structure entry produced no pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotJson,
    NoData,
}

/// Progress reported while a run executes.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    StructureStarted { name: String, pages: usize },
    StructureSkipped { name: String, reason: SkipReason },
    PageResolved { file_path: String, title: Option<String>, depth: usize },
    PageSkipped { file_path: String },
    Finished(RunSummary),
}

/// Counts from a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Structure documents that were flattened.
    pub documents: usize,
    /// Records merged into the output set.
    pub pages: usize,
    /// Fragments removed from the store.
    pub fragments_cleared: usize,
}

pub struct PageBuilder {
    config: BuilderConfig,
    stamp: Stamp,
    events: Option<Sender<BuildEvent>>,
}

impl PageBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            stamp: Stamp::now(),
            events: None,
        }
    }

    /// Send progress events to `tx` (dropped silently if the receiver is gone).
    pub fn with_events(mut self, tx: Sender<BuildEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Replace the version/time stamp put on every record.
    pub fn with_stamp(mut self, stamp: Stamp) -> Self {
        self.stamp = stamp;
        self
    }

    /// Load the configured structure directory under `root`, then [`run`](Self::run).
    pub fn build(
        &self,
        root: &Path,
        fragments: &mut FragmentStore,
        output: &mut OutputFiles,
    ) -> Result<RunSummary, BuildError> {
        let dir = root.join(&self.config.structures);
        tracing::debug!(dir = %dir.display(), "Structure files");
        let structures = load_structures(&dir)?;
        self.run(fragments, &structures, output)
    }

    /// Resolve every structure document against `fragments`.
    pub fn run(
        &self,
        fragments: &mut FragmentStore,
        structures: &StructureFiles,
        output: &mut OutputFiles,
    ) -> Result<RunSummary, BuildError> {
        let (results, documents) = match self.resolve_all(fragments, structures) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::error!(error = %err, "Structure resolution failed");
                return Err(err.into());
            }
        };

        let summary = RunSummary {
            documents,
            pages: results.len(),
            fragments_cleared: fragments.clear(),
        };
        output.extend(results);

        tracing::debug!(pages = summary.pages, "Finished parsing structure");
        self.emit(BuildEvent::Finished(summary));
        Ok(summary)
    }

    fn resolve_all(
        &self,
        fragments: &FragmentStore,
        structures: &StructureFiles,
    ) -> Result<(ResultsMap, usize), ResolveError> {
        let mut results = ResultsMap::new();
        let mut documents = 0;

        for (name, file) in structures {
            let StructureFile::Document(document) = file else {
                tracing::debug!(file = %name, "Skip");
                self.emit(BuildEvent::StructureSkipped {
                    name: name.clone(),
                    reason: SkipReason::NotJson,
                });
                continue;
            };
            let Some(data) = &document.data else {
                self.emit(BuildEvent::StructureSkipped {
                    name: name.clone(),
                    reason: SkipReason::NoData,
                });
                continue;
            };

            tracing::debug!(file = %name, "Structure");
            self.emit(BuildEvent::StructureStarted {
                name: name.clone(),
                pages: data.pages.len(),
            });

            let global_data = resolve_global_data(data.global_data.as_ref(), fragments)?;
            Flattener::new(&global_data, fragments, &self.stamp)
                .with_events(self.events.as_ref())
                .flatten(&data.pages, &ParentContext::root(), &mut results)?;
            documents += 1;
        }
        Ok((results, documents))
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
