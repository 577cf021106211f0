//! Plain HTTP fetching.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

use super::random_user_agent;
use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// Maximum redirects followed
const MAX_REDIRECTS: usize = 10;

/// GET with redirect-following and a browser user agent.
///
/// Certificate errors are ignored: an expired certificate is a finding about
/// the business, not a reason to skip its site.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> FetchResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<FetchedPage> {
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, random_user_agent())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;

        let status = response.status().as_u16();
        let html = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;
        let elapsed = start.elapsed();

        debug!(url = %url, status, elapsed_ms = elapsed.as_millis() as u64, bytes = html.len(), "HTTP fetch");

        Ok(FetchedPage::new(Some(html), elapsed, Some(status)))
    }
}

fn map_reqwest_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
        }
    } else {
        FetchError::Http(Box::new(e))
    }
}
