//! Sequential batch processing and the store that owns its results.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::pipeline::{display_name, ImagePipeline, InputFile, ProcessedResult};

/// One batch entry.
///
/// A `Path` entry is only read from disk when its turn comes, so a read
/// failure lands at the entry's position like any other per-item failure.
#[derive(Debug, Clone)]
pub enum BatchInput {
    /// Bytes already in memory.
    File(InputFile),
    /// A file to read when the item is processed.
    Path(PathBuf),
}

impl BatchInput {
    /// Display name: the file name for paths.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::File(file) => file.name.clone(),
            Self::Path(path) => display_name(path),
        }
    }

    fn load(self) -> Result<InputFile> {
        match self {
            Self::File(file) => Ok(file),
            Self::Path(path) => InputFile::read(&path),
        }
    }
}

impl From<InputFile> for BatchInput {
    fn from(file: InputFile) -> Self {
        Self::File(file)
    }
}

impl From<PathBuf> for BatchInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Runs a list of inputs through an [`ImagePipeline`] one at a time.
///
/// A failing item becomes an error-shaped [`ProcessedResult`]; it never
/// aborts the rest of the batch.
pub struct BatchProcessor<'p, 'm> {
    pipeline: &'p ImagePipeline<'m>,
}

impl<'p, 'm> BatchProcessor<'p, 'm> {
    /// Batch processor driving `pipeline`.
    #[must_use]
    pub fn new(pipeline: &'p ImagePipeline<'m>) -> Self {
        Self { pipeline }
    }

    /// Process every input in order, handing each result to `on_result`.
    ///
    /// `on_result(result, completed, total)` runs after each item, success or
    /// failure, before the next input is pulled from the iterator. Only one
    /// input is held in memory at a time.
    pub fn process_each<I, F>(&self, inputs: I, mut on_result: F)
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        I::Item: Into<BatchInput>,
        F: FnMut(ProcessedResult, usize, usize),
    {
        let inputs = inputs.into_iter();
        let total = inputs.len();

        for (i, input) in inputs.enumerate() {
            let input = input.into();
            let name = input.name();
            let result = input
                .load()
                .and_then(|file| self.pipeline.process(file))
                .unwrap_or_else(|e| {
                    log::error!("Failed to process {name}: {e}");
                    ProcessedResult::failed(name, &e)
                });

            let completed = i + 1;
            log::info!("Processing: {completed}/{total}");
            on_result(result, completed, total);
        }
    }

    /// Process every input in order and collect the results.
    ///
    /// `on_progress(completed, total)` is called after each item, success or
    /// failure, before the next one starts. Results are in input order.
    pub fn process_all<I, F>(&self, inputs: I, mut on_progress: F) -> Vec<ProcessedResult>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        I::Item: Into<BatchInput>,
        F: FnMut(usize, usize),
    {
        let mut results = Vec::new();
        self.process_each(inputs, |result, completed, total| {
            results.push(result);
            on_progress(completed, total);
        });
        results
    }
}

/// Stable identifier of a result inside a [`ResultStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultId(u64);

/// Owned repository of processed results.
///
/// Ids are handed out by [`ResultStore::append`] and never reused, so removing
/// one result does not shift the others.
#[derive(Debug, Default)]
pub struct ResultStore {
    entries: BTreeMap<ResultId, ProcessedResult>,
    next_id: u64,
}

impl ResultStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `result` and return its id.
    pub fn append(&mut self, result: ProcessedResult) -> ResultId {
        let id = ResultId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, result);
        id
    }

    /// Append every result in order.
    pub fn extend(&mut self, results: impl IntoIterator<Item = ProcessedResult>) -> Vec<ResultId> {
        results.into_iter().map(|r| self.append(r)).collect()
    }

    /// Result stored under `id`.
    #[must_use]
    pub fn get(&self, id: ResultId) -> Option<&ProcessedResult> {
        self.entries.get(&id)
    }

    /// Remove one result, releasing its handles.
    pub fn remove(&mut self, id: ResultId) -> Option<ProcessedResult> {
        let mut result = self.entries.remove(&id)?;
        result.release();
        Some(result)
    }

    /// Release every handle and empty the store.
    pub fn clear(&mut self) {
        for result in self.entries.values_mut() {
            result.release();
        }
        log::debug!("Cleared {} results", self.entries.len());
        self.entries.clear();
    }

    /// Results in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ResultId, &ProcessedResult)> {
        self.entries.iter().map(|(id, r)| (*id, r))
    }

    /// Successfully processed results.
    pub fn successes(&self) -> impl Iterator<Item = (ResultId, &ProcessedResult)> {
        self.iter().filter(|(_, r)| r.is_ok())
    }

    /// Failed results.
    pub fn failures(&self) -> impl Iterator<Item = (ResultId, &ProcessedResult)> {
        self.iter().filter(|(_, r)| !r.is_ok())
    }

    /// Number of stored results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
