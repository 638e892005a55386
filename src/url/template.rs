use crate::UrlError;
use url::Url;

/// Placeholder substituted with the page number in listing URLs
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// A catalog listing URL with a `{page}` placeholder
///
/// # Examples
///
/// ```
/// use singles_scout::url::ListingTemplate;
///
/// let template =
///     ListingTemplate::parse("https://bloodmoongames.cl/singles/?product-page={page}").unwrap();
/// assert_eq!(
///     template.render(3).unwrap().as_str(),
///     "https://bloodmoongames.cl/singles/?product-page=3"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTemplate {
    raw: String,
    base: Url,
}

impl ListingTemplate {
    /// Parses and validates a listing template
    ///
    /// The template must contain `{page}` and, once the placeholder is
    /// substituted, be an absolute HTTP or HTTPS URL.
    ///
    /// # Arguments
    ///
    /// * `raw` - The template string
    ///
    /// # Returns
    ///
    /// * `Ok(ListingTemplate)` - A usable template
    /// * `Err(UrlError)` - Missing placeholder, malformed URL or bad scheme
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        if !raw.contains(PAGE_PLACEHOLDER) {
            return Err(UrlError::MissingPlaceholder(raw.to_string()));
        }

        let base = substitute(raw, 1)?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                base.scheme()
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            base,
        })
    }

    /// Builds the URL of the given listing page
    pub fn render(&self, page: u32) -> Result<Url, UrlError> {
        substitute(&self.raw, page)
    }

    /// Resolves a product link against the listing URL
    ///
    /// Absolute links are returned unchanged, relative and protocol-relative
    /// links are joined onto the listing's origin. Returns None for
    /// unparseable hrefs.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.base.join(href).ok().map(|url| url.to_string())
    }
}

fn substitute(raw: &str, page: u32) -> Result<Url, UrlError> {
    let rendered = raw.replace(PAGE_PLACEHOLDER, &page.to_string());
    Url::parse(&rendered).map_err(|e| UrlError::Parse(format!("{}: {}", rendered, e)))
}
