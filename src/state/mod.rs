//! State module for page results and the items they carry
//!
//! # Components
//!
//! - `Item`: one product row extracted from a listing page
//! - `PageResult`: the outcome of fetching one page (items, empty, omitted)
//! - `FetchError`: transient vs permanent failure of a single fetch attempt

mod item;
mod page_result;

// Re-export main types
pub use item::Item;
pub use page_result::{FetchError, PageResult};
