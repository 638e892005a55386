//! In-order release of pages that complete out of order
//!
//! Completed pages wait in a buffer keyed by page number until every lower
//! page has been released. Released items accumulate until the next
//! checkpoint hands them to a [`CheckpointSink`].

use crate::output::{CheckpointSink, OutputResult};
use crate::state::{Item, PageResult};
use std::collections::BTreeMap;

/// A page delivered in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub page: u32,
    pub result: PageResult,

    /// True when this release completes a `pages_per_save` block
    pub checkpoint_due: bool,
}

/// Buffers completed pages and releases them in ascending order
#[derive(Debug)]
pub struct Reassembler {
    start_page: u32,
    pages_per_save: u32,
    next_to_release: u32,
    pending: BTreeMap<u32, PageResult>,
    accumulated: Vec<Item>,
}

impl Reassembler {
    pub fn new(start_page: u32, pages_per_save: u32) -> Self {
        Self {
            start_page,
            pages_per_save: pages_per_save.max(1),
            next_to_release: start_page,
            pending: BTreeMap::new(),
            accumulated: Vec::new(),
        }
    }

    /// Buffers a completed page
    ///
    /// Returns false (and drops the result) for a page that was already
    /// released or is already waiting.
    pub fn submit(&mut self, page: u32, result: PageResult) -> bool {
        if page < self.next_to_release {
            tracing::warn!("Page {} completed again after release, ignoring", page);
            return false;
        }
        if self.pending.contains_key(&page) {
            tracing::warn!("Page {} completed twice, ignoring duplicate", page);
            return false;
        }
        self.pending.insert(page, result);
        true
    }

    /// Releases the next page in order, if it has completed
    ///
    /// The page's items are appended to the accumulation buffer.
    pub fn release_next(&mut self) -> Option<Release> {
        let page = self.next_to_release;
        let result = self.pending.remove(&page)?;

        if let PageResult::Items(items) = &result {
            self.accumulated.extend(items.iter().cloned());
        }
        self.next_to_release = page.saturating_add(1);

        let released = page - self.start_page + 1;
        Some(Release {
            page,
            result,
            checkpoint_due: released % self.pages_per_save == 0,
        })
    }

    /// Flushes the accumulation buffer to `sink`
    ///
    /// Returns the number of items written. The buffer is cleared only when
    /// the flush succeeds; an empty buffer is not flushed.
    pub fn checkpoint(&mut self, sink: &mut dyn CheckpointSink) -> OutputResult<usize> {
        if self.accumulated.is_empty() {
            return Ok(0);
        }
        sink.flush(&self.accumulated)?;
        let written = self.accumulated.len();
        self.accumulated.clear();
        Ok(written)
    }

    pub fn next_to_release(&self) -> u32 {
        self.next_to_release
    }

    /// Items released but not yet flushed
    pub fn accumulated(&self) -> &[Item] {
        &self.accumulated
    }

    /// Completed pages still waiting for a lower page
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
