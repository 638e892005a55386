//! Ordered concurrent pagination
//!
//! Pages are fetched several at a time but released strictly in ascending
//! order, so the output is identical to a sequential walk of the listing.

mod coordinator;
mod detector;
mod fetcher;
mod progress;
mod reassembler;
mod scheduler;

pub use coordinator::{run_store, Paginator, PaginatorSettings, RunSummary, StopReason};
pub use detector::{EndOfListingDetector, Verdict};
pub use fetcher::{PageFetcher, PageSource, RetryPolicy};
pub use progress::{LogProgress, ProgressReporter, Silent};
pub use reassembler::{Reassembler, Release};
pub use scheduler::WindowScheduler;
