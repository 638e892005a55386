/// A single product extracted from a catalog listing page
///
/// Items are created by a store parser and never mutated afterwards; the
/// reassembler moves them into its accumulation buffer and the sink writes
/// them once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Title exactly as shown on the listing
    pub raw_name: String,

    /// Cleaned card name (no edition notes, accents folded)
    pub name: String,

    /// Whether the listing is a foil printing
    pub foil: bool,

    /// Lowest listed price in whole currency units, if one was shown
    pub price: Option<u64>,

    /// Absolute product URL
    pub url: String,
}

impl Item {
    /// Creates a new item
    pub fn new(
        raw_name: impl Into<String>,
        name: impl Into<String>,
        foil: bool,
        price: Option<u64>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            raw_name: raw_name.into(),
            name: name.into(),
            foil,
            price,
            url: url.into(),
        }
    }

    /// Returns the foil flag as written in the CSV column
    pub fn foil_label(&self) -> &'static str {
        if self.foil {
            "Sí"
        } else {
            "No"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foil_label() {
        let foil = Item::new("Sol Ring (Foil)", "Sol Ring", true, Some(9000), "https://x.cl/p");
        let plain = Item::new("Sol Ring", "Sol Ring", false, None, "https://x.cl/p");

        assert_eq!(foil.foil_label(), "Sí");
        assert_eq!(plain.foil_label(), "No");
    }
}
