//! URL handling module for Singles-Scout
//!
//! This module provides the paginated listing template and resolution of
//! relative product links found on listing pages.

mod template;

// Re-export main types
pub use template::{ListingTemplate, PAGE_PLACEHOLDER};
