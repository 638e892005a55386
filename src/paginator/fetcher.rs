//! Page fetching with bounded retry cycles
//!
//! A [`PageSource`] performs a single attempt at loading one listing page.
//! [`PageFetcher`] wraps a source with a [`RetryPolicy`] and always resolves
//! to a [`PageResult`], so a page that cannot be loaded becomes `Omitted`
//! instead of failing the run.

use crate::config::RetryConfig;
use crate::state::{FetchError, Item, PageResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// One fetch attempt for a listing page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches and parses `page`, returning the items found on it
    async fn fetch_page(&self, page: u32) -> Result<Vec<Item>, FetchError>;
}

/// Retry schedule applied to transient failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made within one cycle
    pub attempts_per_cycle: u32,

    /// Number of cycles before the page is given up
    pub max_cycles: u32,

    /// Pause between failed attempts inside a cycle
    pub retry_wait: Duration,

    /// Pause between cycles
    pub cycle_cooldown: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            attempts_per_cycle: config.attempts_per_cycle.max(1),
            max_cycles: config.max_cycles.max(1),
            retry_wait: config.retry_wait(),
            cycle_cooldown: config.cycle_cooldown(),
        }
    }

    /// A policy with no pauses, used where retries should be immediate
    pub fn immediate(attempts_per_cycle: u32, max_cycles: u32) -> Self {
        Self {
            attempts_per_cycle: attempts_per_cycle.max(1),
            max_cycles: max_cycles.max(1),
            retry_wait: Duration::ZERO,
            cycle_cooldown: Duration::ZERO,
        }
    }

    /// Upper bound on source calls for a single page
    pub fn max_attempts(&self) -> u32 {
        self.attempts_per_cycle.saturating_mul(self.max_cycles)
    }
}

/// Resolves pages to [`PageResult`]s through a source and a retry policy
pub struct PageFetcher {
    source: Arc<dyn PageSource>,
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(source: Arc<dyn PageSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Fetches `page`, retrying transient failures
    ///
    /// Permanent failures are not retried. After `attempts_per_cycle *
    /// max_cycles` transient failures the page is reported as omitted.
    pub async fn fetch(&self, page: u32) -> PageResult {
        let attempts = self.policy.attempts_per_cycle;
        let cycles = self.policy.max_cycles;
        let mut last_error = String::new();

        for cycle in 1..=cycles {
            for attempt in 1..=attempts {
                let error = match self.source.fetch_page(page).await {
                    Ok(items) => return PageResult::from_items(items),
                    Err(error) => error,
                };

                if !error.is_retryable() {
                    tracing::warn!("Page {} failed permanently: {}", page, error.reason());
                    return PageResult::Omitted(error.reason().to_string());
                }

                tracing::warn!(
                    "Page {} attempt {}/{} (cycle {}/{}) failed: {}",
                    page,
                    attempt,
                    attempts,
                    cycle,
                    cycles,
                    error.reason()
                );
                last_error = error.reason().to_string();
                if attempt < attempts {
                    pause(self.policy.retry_wait).await;
                }
            }

            if cycle < cycles {
                tracing::warn!(
                    "Page {} exhausted cycle {}/{}, cooling down for {:?}",
                    page,
                    cycle,
                    cycles,
                    self.policy.cycle_cooldown
                );
                pause(self.policy.cycle_cooldown).await;
            }
        }

        tracing::error!(
            "Page {} omitted after {} attempts",
            page,
            self.policy.max_attempts()
        );
        PageResult::Omitted(format!(
            "gave up after {} attempts: {}",
            self.policy.max_attempts(),
            last_error
        ))
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
