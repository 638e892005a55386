//! Output module for checkpoint persistence and catalog aggregation
//!
//! This module handles:
//! - Writing released items to CSV in append or overwrite mode
//! - Finalizing and pruning backups of overwrite-mode runs
//! - Merging per-store CSV files into one unified catalog

mod csv_sink;
pub mod merge;
mod traits;

pub use csv_sink::{AppendCsvSink, OverwriteCsvSink, CSV_HEADER};
pub use merge::{merge_catalogs, merge_catalogs_into, MergeSummary};
pub use traits::{CheckpointSink, OutputError, OutputResult};

use crate::config::OutputMode;
use std::path::Path;

/// Timestamp used in output file names
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Opens the sink for the configured persistence mode
///
/// # Arguments
///
/// * `mode` - Append or overwrite
/// * `dir` - Output directory (created if missing)
/// * `prefix` - File name prefix of the store
pub fn open_sink(mode: OutputMode, dir: &Path, prefix: &str) -> OutputResult<Box<dyn CheckpointSink>> {
    let sink: Box<dyn CheckpointSink> = match mode {
        OutputMode::Append => Box::new(AppendCsvSink::create(dir, prefix)?),
        OutputMode::Overwrite => Box::new(OverwriteCsvSink::open(dir, prefix)?),
    };
    Ok(sink)
}
