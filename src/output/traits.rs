//! Checkpoint sink trait and output error types
//!
//! The paginator hands released items to a sink in page order; the sink
//! decides how they are made durable.

use crate::state::Item;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for checkpoint sinks
///
/// `flush` receives every item released since the last successful flush.
/// A failed flush leaves those items with the caller, which passes them again
/// (together with newer ones) on the next flush.
pub trait CheckpointSink: Send {
    /// Persists a batch of released items
    ///
    /// # Arguments
    ///
    /// * `items` - Items in release order
    fn flush(&mut self, items: &[Item]) -> OutputResult<()>;

    /// Completes a successful run
    ///
    /// # Returns
    ///
    /// The path of the permanent output file, if the sink produced one
    fn finalize(&mut self) -> OutputResult<Option<PathBuf>>;

    /// Path of the file currently being written
    fn path(&self) -> &Path;
}
