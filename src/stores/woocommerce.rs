//! WooCommerce listing parser (BloodMoonGames, HunterCard TCG)

use crate::config::Platform;
use crate::state::Item;
use crate::stores::normalize::{clean_card_name, extract_lowest_price};
use crate::stores::{selector, ListingParser};
use crate::url::ListingTemplate;
use crate::ScoutError;
use scraper::{ElementRef, Html, Selector};

/// Parser for WooCommerce product grids
///
/// Cards are `li.product` (default theme) or `div.thunk-product` (Thunk
/// themes); each card links to the product through
/// `a.woocommerce-LoopProduct-link` and carries the title in
/// `.woocommerce-loop-product__title`.
pub struct WooCommerceParser {
    card: Selector,
    link: Selector,
    title: Selector,
    price: Selector,
    price_amount: Selector,
}

impl WooCommerceParser {
    pub fn new() -> Result<Self, ScoutError> {
        Ok(Self {
            card: selector("li.product, div.thunk-product")?,
            link: selector("a.woocommerce-LoopProduct-link")?,
            title: selector(".woocommerce-loop-product__title")?,
            price: selector("span.price")?,
            price_amount: selector("span.woocommerce-Price-amount")?,
        })
    }

    fn parse_card(&self, card: ElementRef<'_>, template: &ListingTemplate) -> Option<Item> {
        let href = card.select(&self.link).next()?.value().attr("href")?;
        let url = template.resolve(href)?;

        let raw_name = card
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())?;

        // The wrapper holds the whole range ("$4.000 – $12.000"); fall back
        // to the first amount when a theme drops the wrapper.
        let price_text = card
            .select(&self.price)
            .next()
            .or_else(|| card.select(&self.price_amount).next())
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();

        let (name, foil) = clean_card_name(&raw_name);
        Some(Item {
            raw_name,
            name,
            foil,
            price: extract_lowest_price(&price_text),
            url,
        })
    }
}

impl ListingParser for WooCommerceParser {
    fn platform(&self) -> Platform {
        Platform::WooCommerce
    }

    fn parse(&self, html: &str, template: &ListingTemplate) -> Result<Vec<Item>, String> {
        let document = Html::parse_document(html);

        let mut cards = 0;
        let mut items = Vec::new();
        for card in document.select(&self.card) {
            cards += 1;
            match self.parse_card(card, template) {
                Some(item) => items.push(item),
                None => tracing::trace!("Skipping product card without link or title"),
            }
        }

        if cards > 0 && items.is_empty() {
            return Err(format!(
                "{} product cards found but none matched the expected markup",
                cards
            ));
        }

        Ok(items)
    }
}
