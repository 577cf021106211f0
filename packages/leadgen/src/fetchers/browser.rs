//! Headless browser rendering through Browserless.

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, BrowserlessError, ContentOptions};
use std::time::{Duration, Instant};
use tracing::debug;

use super::random_user_agent;
use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// Renders pages in a real browser so client-side content is present.
///
/// Waits for `domcontentloaded`, then lets scripts settle before reading
/// the DOM.
pub struct BrowserFetcher {
    client: BrowserlessClient,
    settle: Duration,
}

impl BrowserFetcher {
    pub fn new(client: BrowserlessClient) -> Self {
        Self {
            client,
            settle: Duration::from_secs(2),
        }
    }

    /// Connect to a Browserless instance.
    pub fn connect(base_url: &str, token: Option<&str>) -> FetchResult<Self> {
        let client =
            BrowserlessClient::new(base_url, token).map_err(|e| FetchError::Browser(e.to_string()))?;
        Ok(Self::new(client))
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &str {
        "browser"
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<FetchedPage> {
        let options = ContentOptions::new(timeout)
            .with_settle(self.settle)
            .with_user_agent(random_user_agent());

        let start = Instant::now();
        let rendered = tokio::time::timeout(timeout + self.settle, self.client.render(url, &options))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| match e {
                BrowserlessError::Timeout(_) => FetchError::Timeout {
                    url: url.to_string(),
                },
                other => FetchError::Browser(other.to_string()),
            })?;
        let elapsed = start.elapsed();

        debug!(url = %url, status = ?rendered.status, elapsed_ms = elapsed.as_millis() as u64, "Browser render");

        Ok(FetchedPage::new(Some(rendered.html), elapsed, rendered.status))
    }
}
