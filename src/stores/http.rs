//! HTTP page source
//!
//! One GET per attempt. Failures are classified here so the retry policy
//! never has to guess:
//!
//! | Condition | Classification |
//! |-----------|----------------|
//! | Timeout, connection error, body read error | Transient |
//! | Any non-2xx status | Transient |
//! | Markup the parser does not recognize | Permanent |

use crate::config::HttpConfig;
use crate::paginator::PageSource;
use crate::state::{FetchError, Item};
use crate::stores::ListingParser;
use crate::url::ListingTemplate;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Builds the shared HTTP client
///
/// # Arguments
///
/// * `config` - User agent and timeout settings
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A store listing fetched over HTTP and parsed by a platform parser
pub struct HttpPageSource {
    name: String,
    client: Client,
    template: ListingTemplate,
    parser: Box<dyn ListingParser>,
}

impl HttpPageSource {
    pub fn new(
        name: &str,
        client: Client,
        template: ListingTemplate,
        parser: Box<dyn ListingParser>,
    ) -> Self {
        Self {
            name: name.to_string(),
            client,
            template,
            parser,
        }
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_builder() {
        FetchError::Permanent(error.to_string())
    } else if error.is_timeout() {
        FetchError::Transient("Request timeout".to_string())
    } else if error.is_connect() {
        FetchError::Transient(format!("Connection failed: {}", error))
    } else {
        FetchError::Transient(error.to_string())
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Item>, FetchError> {
        let url = self
            .template
            .render(page)
            .map_err(|e| FetchError::Permanent(e.to_string()))?;

        tracing::trace!("[{}] GET {}", self.name, url);
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify)?;
        self.parser
            .parse(&body, &self.template)
            .map_err(FetchError::Permanent)
    }
}
