//! Store adapters
//!
//! Each storefront platform gets a `ListingParser` that turns one listing
//! page into items. `HttpPageSource` pairs a parser with a listing template
//! and the shared HTTP client, which is all the paginator needs to know
//! about a store.

mod http;
pub mod normalize;
mod shopify;
mod woocommerce;

pub use http::{build_http_client, HttpPageSource};
pub use shopify::ShopifyParser;
pub use woocommerce::WooCommerceParser;

use crate::config::{Platform, StoreEntry};
use crate::paginator::PageSource;
use crate::state::Item;
use crate::url::ListingTemplate;
use crate::ScoutError;
use reqwest::Client;
use scraper::Selector;
use std::sync::Arc;

/// Trait for site-specific listing parsers
///
/// A parser error means the page does not look like the listing it should
/// be; the paginator omits such pages without retrying.
pub trait ListingParser: Send + Sync {
    /// The platform this parser understands
    fn platform(&self) -> Platform;

    /// Extracts the products of one listing page
    ///
    /// # Arguments
    ///
    /// * `html` - The page body
    /// * `template` - The listing template, used to resolve relative links
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Item>)` - Products in page order (empty at end of listing)
    /// * `Err(String)` - The markup is not what the parser expects
    fn parse(&self, html: &str, template: &ListingTemplate) -> Result<Vec<Item>, String>;
}

/// Builds the parser for a platform
pub fn parser_for(platform: Platform) -> Result<Box<dyn ListingParser>, ScoutError> {
    let parser: Box<dyn ListingParser> = match platform {
        Platform::WooCommerce => Box::new(WooCommerceParser::new()?),
        Platform::Shopify => Box::new(ShopifyParser::new()?),
    };
    Ok(parser)
}

/// Builds the page source for a configured store
///
/// # Arguments
///
/// * `store` - The store entry from the configuration
/// * `client` - Shared HTTP client
pub fn build_page_source(store: &StoreEntry, client: Client) -> Result<Arc<dyn PageSource>, ScoutError> {
    let template = ListingTemplate::parse(&store.listing_url)?;
    let parser = parser_for(store.platform)?;
    Ok(Arc::new(HttpPageSource::new(&store.name, client, template, parser)))
}

/// Compiles a CSS selector
pub(crate) fn selector(css: &str) -> Result<Selector, ScoutError> {
    Selector::parse(css).map_err(|e| ScoutError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}
