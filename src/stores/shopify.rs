//! Shopify listing parser (OasisGames)

use crate::config::Platform;
use crate::state::Item;
use crate::stores::normalize::{collapse_whitespace, extract_lowest_price};
use crate::stores::{selector, ListingParser};
use crate::url::ListingTemplate;
use crate::ScoutError;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Parser for Shopify collection grids
///
/// The theme exposes every variant of a product as a JSON map in the
/// `variants` attribute of `div.product-price`, prices in cents.
pub struct ShopifyParser {
    card: Selector,
    title: Selector,
    link: Selector,
    price: Selector,
}

impl ShopifyParser {
    pub fn new() -> Result<Self, ScoutError> {
        Ok(Self {
            card: selector("div.grid-view-item")?,
            title: selector(".grid-view-item__title")?,
            link: selector("a.full-unstyled-link, a.grid-view-item__link")?,
            price: selector("div.product-price")?,
        })
    }

    fn parse_card(&self, card: ElementRef<'_>, template: &ListingTemplate) -> Result<Option<Item>, String> {
        let Some(raw_name) = card
            .select(&self.title)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|s| !s.is_empty())
        else {
            return Ok(None);
        };

        let url = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| template.resolve(href))
            .unwrap_or_default();

        let price = match card.select(&self.price).next() {
            Some(el) => match el.value().attr("variants") {
                Some(json) => lowest_variant_price(json)?,
                None => extract_lowest_price(&el.text().collect::<String>()),
            },
            None => None,
        };

        let (name, foil) = shopify_name(&raw_name);
        Ok(Some(Item {
            raw_name,
            name,
            foil,
            price,
            url,
        }))
    }
}

/// Name before the first parenthesis; foil unless marked non-foil
fn shopify_name(raw_name: &str) -> (String, bool) {
    let lower = raw_name.to_lowercase();
    let foil = lower.contains("foil") && !lower.contains("non-foil");
    let name = raw_name.split('(').next().unwrap_or_default().trim().to_string();
    (name, foil)
}

/// Lowest price among variants, converted from cents
fn lowest_variant_price(json: &str) -> Result<Option<u64>, String> {
    let variants: Value =
        serde_json::from_str(json).map_err(|e| format!("malformed variants JSON: {}", e))?;

    let entries: Vec<&Value> = match &variants {
        Value::Object(map) => map.values().collect(),
        Value::Array(list) => list.iter().collect(),
        _ => return Err("variants attribute is neither a map nor a list".to_string()),
    };

    let lowest = entries
        .into_iter()
        .filter_map(|variant| match variant.get("price")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse::<u64>().ok(),
            _ => None,
        })
        .min();

    Ok(lowest.map(|cents| cents / 100))
}

impl ListingParser for ShopifyParser {
    fn platform(&self) -> Platform {
        Platform::Shopify
    }

    fn parse(&self, html: &str, template: &ListingTemplate) -> Result<Vec<Item>, String> {
        let document = Html::parse_document(html);

        let mut items = Vec::new();
        for card in document.select(&self.card) {
            if let Some(item) = self.parse_card(card, template)? {
                items.push(item);
            }
        }

        Ok(items)
    }
}
