//! Ordering, bounding and termination properties of the paginator
//!
//! These tests drive the paginator with synthetic page sources whose
//! completion order is scrambled by per-page delays.

use async_trait::async_trait;
use singles_scout::output::{AppendCsvSink, CheckpointSink, OutputResult, OverwriteCsvSink};
use singles_scout::paginator::{
    PageFetcher, PageSource, Paginator, PaginatorSettings, ProgressReporter, RetryPolicy,
};
use singles_scout::{FetchError, Item, PageResult, StopReason};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

/// A listing whose pages in `full` carry items and every other page is empty
struct SyntheticListing {
    full: HashSet<u32>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SyntheticListing {
    fn new(full: impl IntoIterator<Item = u32>) -> Arc<Self> {
        Arc::new(Self {
            full: full.into_iter().collect(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Scrambled but deterministic completion times
fn delay_for(page: u32) -> Duration {
    Duration::from_millis(u64::from((page * 7919) % 13) * 3)
}

fn card(page: u32, index: u32) -> Item {
    let name = format!("card {}-{}", page, index);
    Item::new(
        name.clone(),
        name,
        index % 2 == 0,
        Some(u64::from(page) * 100),
        format!("https://store.test/p/{}/{}", page, index),
    )
}

#[async_trait]
impl PageSource for SyntheticListing {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Item>, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(delay_for(page)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.full.contains(&page) {
            Ok((0..3).map(|index| card(page, index)).collect())
        } else {
            Ok(Vec::new())
        }
    }
}

/// Records released pages and optionally fires a notification
#[derive(Default)]
struct ReleaseLog {
    pages: Mutex<Vec<u32>>,
    notify_after: Option<(u32, Arc<Notify>)>,
}

impl ReleaseLog {
    fn pages(&self) -> Vec<u32> {
        self.pages.lock().unwrap().clone()
    }
}

impl ProgressReporter for ReleaseLog {
    fn page_released(&self, page: u32, _result: &PageResult) {
        self.pages.lock().unwrap().push(page);
        if let Some((after, notify)) = &self.notify_after {
            if page == *after {
                notify.notify_one();
            }
        }
    }
}

/// Keeps every flushed batch in memory
#[derive(Default)]
struct BatchSink {
    batches: Vec<Vec<String>>,
}

impl BatchSink {
    fn names(&self) -> Vec<String> {
        self.batches.iter().flatten().cloned().collect()
    }
}

impl CheckpointSink for BatchSink {
    fn flush(&mut self, items: &[Item]) -> OutputResult<()> {
        self.batches
            .push(items.iter().map(|item| item.name.clone()).collect());
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<Option<PathBuf>> {
        Ok(None)
    }

    fn path(&self) -> &Path {
        Path::new("memory")
    }
}

fn settings(window_size: usize) -> PaginatorSettings {
    PaginatorSettings {
        window_size,
        pages_per_save: 10,
        max_consecutive_empty: 5,
        max_page: 20_000,
    }
}

fn paginator(
    source: Arc<SyntheticListing>,
    settings: PaginatorSettings,
    log: Arc<ReleaseLog>,
) -> Paginator {
    let fetcher = PageFetcher::new(source, RetryPolicy::immediate(2, 2));
    Paginator::new(settings, fetcher).with_progress(log)
}

fn expected_names(pages: impl IntoIterator<Item = u32>) -> Vec<String> {
    pages
        .into_iter()
        .flat_map(|page| (0..3).map(move |index| format!("card {}-{}", page, index)))
        .collect()
}

#[tokio::test]
async fn test_release_order_is_gapless_and_ascending() {
    let source = SyntheticListing::new(1..=40);
    let log = Arc::new(ReleaseLog::default());
    let mut sink = BatchSink::default();

    let summary = paginator(source, settings(6), log.clone())
        .run(1, &mut sink)
        .await
        .unwrap();

    let released = log.pages();
    assert_eq!(released, (1..=45).collect::<Vec<_>>());
    assert_eq!(summary.last_released, Some(45));
    assert_eq!(sink.names(), expected_names(1..=40));
}

#[tokio::test]
async fn test_release_order_from_later_start_page() {
    let source = SyntheticListing::new(1..=30);
    let log = Arc::new(ReleaseLog::default());
    let mut sink = BatchSink::default();

    paginator(source, settings(4), log.clone())
        .run(12, &mut sink)
        .await
        .unwrap();

    assert_eq!(log.pages().first(), Some(&12));
    assert!(log.pages().windows(2).all(|pair| pair[1] == pair[0] + 1));
    assert_eq!(sink.names(), expected_names(12..=30));
}

#[tokio::test]
async fn test_window_bounds_concurrency() {
    for window in [1, 3, 8] {
        let source = SyntheticListing::new(1..=30);
        let log = Arc::new(ReleaseLog::default());
        let mut sink = BatchSink::default();

        paginator(source.clone(), settings(window), log)
            .run(1, &mut sink)
            .await
            .unwrap();

        assert!(source.max_in_flight() >= 1);
        assert!(
            source.max_in_flight() <= window,
            "window {} saw {} concurrent fetches",
            window,
            source.max_in_flight()
        );
    }
}

#[tokio::test]
async fn test_stops_after_threshold_of_empty_pages() {
    let source = SyntheticListing::new(1..=10);
    let log = Arc::new(ReleaseLog::default());
    let mut sink = BatchSink::default();

    let summary = paginator(source, settings(6), log.clone())
        .run(1, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::EndOfListing);
    assert_eq!(log.pages().last(), Some(&15));
    assert!(log.pages().iter().all(|page| *page <= 15));
    assert_eq!(sink.names(), expected_names(1..=10));
    assert_eq!(summary.empty_pages, 5);
}

#[tokio::test]
async fn test_checkpoint_cadence() {
    let source = SyntheticListing::new(1..=25);
    let log = Arc::new(ReleaseLog::default());
    let mut sink = BatchSink::default();

    let summary = paginator(source, settings(6), log)
        .run(1, &mut sink)
        .await
        .unwrap();

    let sizes: Vec<usize> = sink.batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, [30, 30, 15]);
    assert_eq!(sink.batches[2], expected_names(21..=25));
    assert_eq!(summary.flushes, 3);
}

#[tokio::test]
async fn test_no_recovery_past_false_end() {
    let source = SyntheticListing::new((1..=10).chain(16..=20));
    let log = Arc::new(ReleaseLog::default());
    let mut sink = BatchSink::default();

    let summary = paginator(source, settings(6), log.clone())
        .run(1, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::EndOfListing);
    assert!(!log.pages().contains(&16));
    assert_eq!(sink.names(), expected_names(1..=10));
}

#[tokio::test]
async fn test_rerun_produces_identical_csv() {
    let dir = TempDir::new().unwrap();

    let mut bodies = Vec::new();
    for stamp in ["20240101_000000", "20240101_000001"] {
        let source = SyntheticListing::new(1..=17);
        let log = Arc::new(ReleaseLog::default());
        let mut sink = AppendCsvSink::create_with_stamp(dir.path(), "List_Synth", stamp).unwrap();

        let summary = paginator(source, settings(5), log)
            .run(1, &mut sink)
            .await
            .unwrap();

        let output = summary.output.unwrap();
        bodies.push(std::fs::read_to_string(output).unwrap());
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0].lines().count(), 1 + 17 * 3);
}

#[tokio::test]
async fn test_interrupt_keeps_ordered_prefix() {
    let dir = TempDir::new().unwrap();
    let notify = Arc::new(Notify::new());
    let log = Arc::new(ReleaseLog {
        pages: Mutex::new(Vec::new()),
        notify_after: Some((7, notify.clone())),
    });
    let source = SyntheticListing::new(1..=200);
    let mut sink = OverwriteCsvSink::open(dir.path(), "List_Synth").unwrap();

    let shutdown = async move { notify.notified().await };
    let summary = paginator(source, settings(4), log.clone())
        .run_until(1, &mut sink, shutdown)
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::Interrupted);
    let last = summary.last_released.unwrap();
    assert!(last >= 7);
    assert!(last < 200);

    // Nothing finalized: the current file holds exactly the released prefix
    let current = dir.path().join("List_Synth_current.csv");
    assert_eq!(summary.output.as_deref(), Some(current.as_path()));
    let body = std::fs::read_to_string(&current).unwrap();
    assert_eq!(body.lines().count(), 1 + last as usize * 3);

    let names: Vec<String> = body
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(1).unwrap().to_string())
        .collect();
    assert_eq!(names, expected_names(1..=last));
}
