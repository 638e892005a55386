use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Singles-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub paginator: PaginatorConfig,
    pub retry: RetryConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "store")]
    pub stores: Vec<StoreEntry>,
}

impl Config {
    /// Looks up a configured store by name (case-insensitive)
    pub fn store(&self, name: &str) -> Option<&StoreEntry> {
        self.stores
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}

/// Prefetch window and termination configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatorConfig {
    /// Number of page fetches kept in flight
    #[serde(rename = "window-size")]
    pub window_size: u32,

    /// Released pages between checkpoint flushes
    #[serde(rename = "pages-per-save")]
    pub pages_per_save: u32,

    /// Consecutive empty/omitted pages that end the listing
    #[serde(rename = "max-consecutive-empty")]
    pub max_consecutive_empty: u32,

    /// Highest page number ever scheduled
    #[serde(rename = "max-page")]
    pub max_page: u32,

    /// Seconds to wait for the interactive start page answer
    #[serde(rename = "prompt-timeout-secs")]
    pub prompt_timeout_secs: u64,
}

/// Per-page retry policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per retry cycle
    #[serde(rename = "attempts-per-cycle")]
    pub attempts_per_cycle: u32,

    /// Number of retry cycles before a page is omitted
    #[serde(rename = "max-cycles")]
    pub max_cycles: u32,

    /// Delay between failed attempts within a cycle (seconds)
    #[serde(rename = "retry-wait-secs")]
    pub retry_wait_secs: u64,

    /// Delay between cycles (seconds)
    #[serde(rename = "cycle-cooldown-secs")]
    pub cycle_cooldown_secs: u64,
}

impl RetryConfig {
    pub fn retry_wait(&self) -> Duration {
        Duration::from_secs(self.retry_wait_secs)
    }

    pub fn cycle_cooldown(&self) -> Duration {
        Duration::from_secs(self.cycle_cooldown_secs)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

/// How checkpoints are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Each flush appends to one growing timestamped file
    Append,
    /// Each flush rewrites a current file; finalized on success
    Overwrite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives CSV files
    pub directory: String,

    /// Checkpoint persistence policy
    pub mode: OutputMode,

    /// File name prefix picked up by the merge step
    #[serde(rename = "merge-prefix")]
    pub merge_prefix: String,
}

/// Storefront platform, which selects the listing parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    WooCommerce,
    Shopify,
}

/// A store to scrape
#[derive(Debug, Clone, Deserialize)]
pub struct StoreEntry {
    /// Short name used on the command line
    pub name: String,

    /// Storefront platform
    pub platform: Platform,

    /// Listing URL with a `{page}` placeholder
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Output file name prefix (e.g. "List_BloodMoon")
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,
}
