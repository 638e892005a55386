//! Paginator coordinator - the single controlling loop of a run
//!
//! This module drives one store listing from a start page to a terminal
//! state:
//! - Keeping the prefetch window full
//! - Releasing completed pages in ascending order
//! - Writing checkpoints at the configured cadence
//! - Stopping at the end of the listing, at the page ceiling, or on interrupt

use crate::config::{Config, PaginatorConfig, StoreEntry};
use crate::output::{open_sink, CheckpointSink};
use crate::paginator::detector::{EndOfListingDetector, Verdict};
use crate::paginator::fetcher::{PageFetcher, RetryPolicy};
use crate::paginator::progress::{LogProgress, ProgressReporter};
use crate::paginator::reassembler::{Reassembler, Release};
use crate::paginator::scheduler::WindowScheduler;
use crate::state::PageResult;
use crate::stores::{build_http_client, build_page_source};
use crate::shutdown::Shutdown;
use crate::ScoutError;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Too many consecutive blank pages
    EndOfListing,
    /// Every page up to the ceiling was released
    PageCeiling,
    /// The shutdown signal fired
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfListing => write!(f, "end of listing"),
            Self::PageCeiling => write!(f, "page ceiling reached"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Tunables for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatorSettings {
    pub window_size: usize,
    pub pages_per_save: u32,
    pub max_consecutive_empty: u32,
    pub max_page: u32,
}

impl Default for PaginatorSettings {
    fn default() -> Self {
        Self {
            window_size: 6,
            pages_per_save: 10,
            max_consecutive_empty: 5,
            max_page: 20_000,
        }
    }
}

impl From<&PaginatorConfig> for PaginatorSettings {
    fn from(config: &PaginatorConfig) -> Self {
        Self {
            window_size: config.window_size as usize,
            pages_per_save: config.pages_per_save,
            max_consecutive_empty: config.max_consecutive_empty,
            max_page: config.max_page,
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub start_page: u32,
    pub last_released: Option<u32>,
    pub pages_released: u32,
    pub items_written: usize,
    pub empty_pages: u32,
    pub omitted_pages: u32,
    pub flushes: u32,
    pub failed_flushes: u32,

    /// Items released but never written because the last flush failed
    pub unsaved_items: usize,

    pub stop_reason: StopReason,

    /// Final CSV file, or the in-progress file for an interrupted run
    pub output: Option<PathBuf>,
}

impl RunSummary {
    fn new(start_page: u32) -> Self {
        Self {
            start_page,
            last_released: None,
            pages_released: 0,
            items_written: 0,
            empty_pages: 0,
            omitted_pages: 0,
            flushes: 0,
            failed_flushes: 0,
            unsaved_items: 0,
            stop_reason: StopReason::PageCeiling,
            output: None,
        }
    }

    fn record(&mut self, release: &Release) {
        self.last_released = Some(release.page);
        self.pages_released += 1;
        match release.result {
            PageResult::Items(_) => {}
            PageResult::Empty => self.empty_pages += 1,
            PageResult::Omitted(_) => self.omitted_pages += 1,
        }
    }
}

/// Ordered concurrent paginator over one page source
pub struct Paginator {
    settings: PaginatorSettings,
    fetcher: Arc<PageFetcher>,
    progress: Arc<dyn ProgressReporter>,
}

impl Paginator {
    pub fn new(settings: PaginatorSettings, fetcher: PageFetcher) -> Self {
        Self {
            settings,
            fetcher: Arc::new(fetcher),
            progress: Arc::new(LogProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Runs until the end of the listing or the page ceiling
    pub async fn run(
        &self,
        start_page: u32,
        sink: &mut dyn CheckpointSink,
    ) -> Result<RunSummary, ScoutError> {
        self.run_until(start_page, sink, std::future::pending()).await
    }

    /// Runs until a terminal state or until `shutdown` resolves
    ///
    /// Items are handed to `sink` strictly in page order. Accumulated items
    /// are flushed once more at the end of every run, but the sink is only
    /// finalized when the run was not interrupted.
    pub async fn run_until<F>(
        &self,
        start_page: u32,
        sink: &mut dyn CheckpointSink,
        shutdown: F,
    ) -> Result<RunSummary, ScoutError>
    where
        F: Future<Output = ()>,
    {
        let start_page = start_page.max(1);
        let progress = self.progress.as_ref();
        let mut scheduler =
            WindowScheduler::new(start_page, self.settings.window_size, self.settings.max_page);
        let mut reassembler = Reassembler::new(start_page, self.settings.pages_per_save);
        let mut detector = EndOfListingDetector::new(self.settings.max_consecutive_empty);
        let mut summary = RunSummary::new(start_page);

        tracing::info!(
            "Starting at page {} with {} pages in flight, stopping after {} blank pages",
            start_page,
            self.settings.window_size,
            detector.threshold()
        );

        tokio::pin!(shutdown);
        scheduler.fill(&self.fetcher, progress);

        let stop_reason = 'run: loop {
            let completed = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::warn!("Shutdown requested, stopping after page {:?}", summary.last_released);
                    break 'run StopReason::Interrupted;
                }
                completed = scheduler.next_completed() => completed,
            };

            let Some((page, result)) = completed else {
                if reassembler.pending() > 0 {
                    tracing::warn!(
                        "{} completed pages could not be released past page {}",
                        reassembler.pending(),
                        reassembler.next_to_release()
                    );
                }
                break 'run StopReason::PageCeiling;
            };

            progress.page_completed(page, &result);
            reassembler.submit(page, result);
            scheduler.fill(&self.fetcher, progress);

            while let Some(release) = reassembler.release_next() {
                summary.record(&release);
                progress.page_released(release.page, &release.result);

                if release.checkpoint_due {
                    self.checkpoint(&mut reassembler, sink, release.page, &mut summary);
                }

                if detector.observe(&release.result) == Verdict::Stop {
                    tracing::info!(
                        "{} consecutive blank pages ending at page {}, listing finished",
                        detector.consecutive(),
                        release.page
                    );
                    break 'run StopReason::EndOfListing;
                }
            }
        };

        scheduler.shutdown().await;

        let last_page = summary.last_released.unwrap_or(start_page);
        self.checkpoint(&mut reassembler, sink, last_page, &mut summary);
        summary.unsaved_items = reassembler.accumulated().len();
        if summary.unsaved_items > 0 {
            tracing::error!("{} items could not be saved", summary.unsaved_items);
        }

        summary.stop_reason = stop_reason;
        summary.output = match stop_reason {
            StopReason::Interrupted => Some(sink.path().to_path_buf()),
            StopReason::EndOfListing | StopReason::PageCeiling => sink.finalize()?,
        };

        tracing::info!(
            "Run finished ({}): {} pages released, {} items written",
            summary.stop_reason,
            summary.pages_released,
            summary.items_written
        );
        Ok(summary)
    }

    fn checkpoint(
        &self,
        reassembler: &mut Reassembler,
        sink: &mut dyn CheckpointSink,
        page: u32,
        summary: &mut RunSummary,
    ) {
        match reassembler.checkpoint(sink) {
            Ok(0) => {}
            Ok(written) => {
                summary.flushes += 1;
                summary.items_written += written;
                self.progress.checkpoint_written(page, written);
            }
            Err(e) => {
                summary.failed_flushes += 1;
                self.progress.checkpoint_failed(page, &e);
            }
        }
    }
}

/// Scrapes one configured store into its CSV output
///
/// A triggered `shutdown` interrupts the run; whatever was released is still
/// flushed.
pub async fn run_store(
    config: &Config,
    store: &StoreEntry,
    start_page: u32,
    shutdown: &Shutdown,
) -> Result<RunSummary, ScoutError> {
    let client = build_http_client(&config.http)?;
    let source = build_page_source(store, client)?;
    let fetcher = PageFetcher::new(source, RetryPolicy::from_config(&config.retry));
    let paginator = Paginator::new(PaginatorSettings::from(&config.paginator), fetcher);

    let directory = Path::new(&config.output.directory);
    let mut sink = open_sink(config.output.mode, directory, &store.file_prefix)?;
    tracing::info!("Writing {} to {}", store.name, sink.path().display());

    paginator
        .run_until(start_page, sink.as_mut(), shutdown.wait())
        .await
}
