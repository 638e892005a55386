/// Page result and fetch error definitions
///
/// A page fetch either yields items, yields nothing, or is given up on.
use crate::state::Item;
use std::fmt;
use thiserror::Error;

/// Outcome of fetching and parsing one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    /// The page loaded and contained at least one product
    Items(Vec<Item>),

    /// The page loaded but matched no products (possible end of listing)
    Empty,

    /// The page was skipped after a permanent failure or exhausted retries
    Omitted(String),
}

impl PageResult {
    /// Builds a result from parsed items, mapping an empty list to `Empty`
    pub fn from_items(items: Vec<Item>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Items(items)
        }
    }

    /// Returns true if this result counts toward the end-of-listing run
    ///
    /// `Empty` and `Omitted` are treated identically here.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Empty | Self::Omitted(_))
    }

    /// Number of items carried by this result
    pub fn item_count(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Empty | Self::Omitted(_) => 0,
        }
    }
}

impl fmt::Display for PageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items(items) => write!(f, "{} items", items.len()),
            Self::Empty => write!(f, "empty"),
            Self::Omitted(reason) => write!(f, "omitted ({})", reason),
        }
    }
}

/// Failure of a single fetch attempt
///
/// Retry policy depends only on the variant: transient errors are retried
/// within the cycle budget, permanent errors never are.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connectivity problem, timeout or any non-success HTTP status
    #[error("transient failure: {0}")]
    Transient(String),

    /// Page structure that retrying will not fix
    #[error("permanent failure: {0}")]
    Permanent(String),
}

impl FetchError {
    /// Returns true if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Human-readable cause, without the classification prefix
    pub fn reason(&self) -> &str {
        match self {
            Self::Transient(reason) | Self::Permanent(reason) => reason,
        }
    }

    /// Classifies a non-success HTTP status
    ///
    /// Every status is transient; only unparseable markup is permanent.
    pub fn from_status(status: u16) -> Self {
        Self::Transient(format!("HTTP {}", status))
    }
}
