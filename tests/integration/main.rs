//! Integration tests for Singles-Scout

mod paginator_tests;
mod store_tests;
