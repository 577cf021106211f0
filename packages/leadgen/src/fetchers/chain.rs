//! Ordered fetch strategies.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// Extra time a strategy gets on top of the fetch timeout (render settle etc.)
const STRATEGY_GRACE: Duration = Duration::from_secs(5);

/// Tries each strategy in order.
///
/// The first plausible page wins. If none is plausible, the last page any
/// strategy did return is used. Only when every strategy fails is the fetch
/// an error.
pub struct FallbackFetcher {
    strategies: Vec<Arc<dyn PageFetcher>>,
    plausible_min_chars: usize,
}

impl FallbackFetcher {
    pub fn new(plausible_min_chars: usize) -> Self {
        Self {
            strategies: Vec::new(),
            plausible_min_chars,
        }
    }

    /// Append a strategy to the end of the chain.
    pub fn with_strategy(mut self, strategy: Arc<dyn PageFetcher>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[async_trait]
impl PageFetcher for FallbackFetcher {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<FetchedPage> {
        let mut implausible: Option<FetchedPage> = None;
        let mut last_error: Option<FetchError> = None;

        for strategy in &self.strategies {
            let outcome =
                match tokio::time::timeout(timeout + STRATEGY_GRACE, strategy.fetch(url, timeout))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(FetchError::Timeout {
                        url: url.to_string(),
                    }),
                };

            match outcome {
                Ok(page) if page.is_plausible(self.plausible_min_chars) => return Ok(page),
                Ok(page) => {
                    debug!(
                        url = %url,
                        strategy = strategy.name(),
                        bytes = page.html_len(),
                        "Implausibly short page, trying next strategy"
                    );
                    implausible = Some(page);
                }
                Err(e) => {
                    debug!(url = %url, strategy = strategy.name(), error = %e, "Fetch strategy failed");
                    last_error = Some(e);
                }
            }
        }

        if let Some(page) = implausible {
            return Ok(page);
        }

        Err(FetchError::AllFailed {
            url: url.to_string(),
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no fetch strategies configured".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    const URL: &str = "https://example.com";

    fn long_page() -> String {
        format!("<html><body>{}</body></html>", "content ".repeat(100))
    }

    #[tokio::test]
    async fn test_first_plausible_page_wins() {
        let browser = Arc::new(MockFetcher::new().with_page(URL, &long_page()));
        let http = Arc::new(MockFetcher::new().with_page(URL, "<html>http</html>"));
        let chain = FallbackFetcher::new(500)
            .with_strategy(browser.clone())
            .with_strategy(http.clone());

        let page = chain.fetch(URL, Duration::from_secs(1)).await.unwrap();

        assert_eq!(page.html, Some(long_page()));
        assert!(http.calls().is_empty());
    }

    #[tokio::test]
    async fn test_short_render_falls_through_to_http() {
        let browser = Arc::new(MockFetcher::new().with_page(URL, "<html></html>"));
        let http = Arc::new(MockFetcher::new().with_page(URL, &long_page()));
        let chain = FallbackFetcher::new(500)
            .with_strategy(browser)
            .with_strategy(http.clone());

        let page = chain.fetch(URL, Duration::from_secs(1)).await.unwrap();

        assert_eq!(page.html, Some(long_page()));
        assert_eq!(http.calls(), vec![URL.to_string()]);
    }

    #[tokio::test]
    async fn test_implausible_page_used_when_later_strategy_fails() {
        let browser = Arc::new(MockFetcher::new().with_page(URL, "<html>tiny</html>"));
        let http = Arc::new(MockFetcher::new().with_error(URL, "connection reset"));
        let chain = FallbackFetcher::new(500).with_strategy(browser).with_strategy(http);

        let page = chain.fetch(URL, Duration::from_secs(1)).await.unwrap();

        assert_eq!(page.html.as_deref(), Some("<html>tiny</html>"));
    }

    #[tokio::test]
    async fn test_all_strategies_failing_is_error() {
        let chain = FallbackFetcher::new(500)
            .with_strategy(Arc::new(MockFetcher::new().with_error(URL, "browser crashed")))
            .with_strategy(Arc::new(MockFetcher::new().with_error(URL, "dns failure")));

        let err = chain.fetch(URL, Duration::from_secs(1)).await.unwrap_err();

        match err {
            FetchError::AllFailed { url, last } => {
                assert_eq!(url, URL);
                assert!(last.contains("dns failure"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_hung_strategy_is_bounded() {
        let slow = MockFetcher::new()
            .with_page(URL, &long_page())
            .with_delay(URL, Duration::from_secs(60));
        let http = Arc::new(MockFetcher::new().with_page(URL, &long_page()));
        let chain = FallbackFetcher::new(500)
            .with_strategy(Arc::new(slow))
            .with_strategy(http.clone());

        tokio::time::pause();
        let page = chain.fetch(URL, Duration::from_millis(10)).await.unwrap();

        assert!(page.is_plausible(500));
        assert_eq!(http.calls().len(), 1);
    }
}
