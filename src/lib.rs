//! Singles-Scout: an ordered, concurrent catalog scraper for MTG singles stores
//!
//! This crate walks the paginated product listing of a WooCommerce or Shopify
//! storefront, fetching several pages at once while writing the extracted
//! products to CSV strictly in page order, with bounded retries per page and
//! periodic checkpoints.

pub mod config;
pub mod output;
pub mod paginator;
pub mod prompt;
pub mod shutdown;
pub mod state;
pub mod stores;
pub mod url;

use thiserror::Error;

/// Main error type for Singles-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unknown store '{0}'")]
    UnknownStore(String),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Listing URL has no {{page}} placeholder: {0}")]
    MissingPlaceholder(String),
}

// Re-export commonly used types
pub use config::Config;
pub use paginator::{Paginator, RunSummary, StopReason};
pub use state::{FetchError, Item, PageResult};
pub use url::ListingTemplate;
