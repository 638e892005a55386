//! Prefetch window scheduler
//!
//! This module handles:
//! - Keeping up to `window_size` page fetches in flight
//! - Handing out page numbers in ascending order, each exactly once
//! - Never scheduling a page above the configured ceiling
//! - Aborting in-flight fetches when the run ends

use crate::paginator::fetcher::PageFetcher;
use crate::paginator::progress::ProgressReporter;
use crate::state::PageResult;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Bounded set of in-flight page fetches
pub struct WindowScheduler {
    window_size: usize,
    max_page: u32,

    /// Next page never submitted; `None` once the ceiling was reached
    next_page: Option<u32>,

    in_flight: JoinSet<(u32, PageResult)>,
    stopped: bool,
}

impl WindowScheduler {
    pub fn new(start_page: u32, window_size: usize, max_page: u32) -> Self {
        let next_page = Some(start_page.max(1)).filter(|page| *page <= max_page);
        Self {
            window_size: window_size.max(1),
            max_page,
            next_page,
            in_flight: JoinSet::new(),
            stopped: false,
        }
    }

    /// Submits new fetches until the window is full
    ///
    /// Returns the number of pages submitted.
    pub fn fill(&mut self, fetcher: &Arc<PageFetcher>, progress: &dyn ProgressReporter) -> usize {
        let mut submitted = 0;

        while !self.stopped && self.in_flight.len() < self.window_size {
            let Some(page) = self.next_page else {
                break;
            };
            self.next_page = page.checked_add(1).filter(|next| *next <= self.max_page);

            let fetcher = Arc::clone(fetcher);
            self.in_flight.spawn(async move {
                let result = AssertUnwindSafe(fetcher.fetch(page))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        tracing::error!("Fetch task for page {} panicked", page);
                        PageResult::Omitted("fetch task panicked".to_string())
                    });
                (page, result)
            });

            submitted += 1;
            progress.page_dispatched(page, self.in_flight());
        }

        if self.next_page.is_none() && submitted > 0 {
            tracing::debug!("Reached page ceiling {}", self.max_page);
        }
        submitted
    }

    /// Waits for any in-flight fetch to complete
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completed(&mut self) -> Option<(u32, PageResult)> {
        loop {
            match self.in_flight.join_next().await? {
                Ok(completed) => return Some(completed),
                Err(e) if e.is_cancelled() => continue,
                Err(e) => tracing::error!("Fetch task failed: {}", e),
            }
        }
    }

    /// Prevents any further submissions
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Stops the scheduler and aborts every in-flight fetch
    pub async fn shutdown(&mut self) {
        self.stop();
        let abandoned = self.in_flight();
        if abandoned > 0 {
            tracing::debug!("Aborting {} in-flight fetches", abandoned);
        }
        self.in_flight.shutdown().await;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
