//! Progress hooks for paginator runs

use crate::output::OutputError;
use crate::state::PageResult;

/// Observer notified as pages move through a run
///
/// Every hook defaults to doing nothing. Implementations must not block.
pub trait ProgressReporter: Send + Sync {
    fn page_dispatched(&self, _page: u32, _in_flight: usize) {}

    fn page_completed(&self, _page: u32, _result: &PageResult) {}

    fn page_released(&self, _page: u32, _result: &PageResult) {}

    fn checkpoint_written(&self, _page: u32, _items: usize) {}

    fn checkpoint_failed(&self, _page: u32, _error: &OutputError) {}
}

/// Reports progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn page_dispatched(&self, page: u32, in_flight: usize) {
        tracing::debug!("Dispatched page {} ({} in flight)", page, in_flight);
    }

    fn page_completed(&self, page: u32, result: &PageResult) {
        tracing::debug!("Page {} completed: {}", page, result);
    }

    fn page_released(&self, page: u32, result: &PageResult) {
        match result {
            PageResult::Omitted(reason) => {
                tracing::warn!("Page {} omitted: {}", page, reason)
            }
            _ => tracing::info!("Page {}: {}", page, result),
        }
    }

    fn checkpoint_written(&self, page: u32, items: usize) {
        tracing::info!("Checkpoint at page {}: {} items saved", page, items);
    }

    fn checkpoint_failed(&self, page: u32, error: &OutputError) {
        tracing::error!(
            "Checkpoint at page {} failed, keeping items for the next one: {}",
            page,
            error
        );
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ProgressReporter for Silent {}
