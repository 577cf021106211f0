//! Page fetching.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::FetchResult;

/// Result of fetching one page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// Response body, `None` when the strategy produced nothing
    pub html: Option<String>,

    /// Wall time spent on the fetch
    pub elapsed: Duration,

    /// HTTP status, when the strategy could observe one
    pub status: Option<u16>,
}

impl FetchedPage {
    pub fn new(html: Option<String>, elapsed: Duration, status: Option<u16>) -> Self {
        Self {
            html,
            elapsed,
            status,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Body length in bytes (0 when absent).
    pub fn html_len(&self) -> usize {
        self.html.as_ref().map_or(0, String::len)
    }

    /// Whether the body is long enough to be a real page.
    pub fn is_plausible(&self, min_chars: usize) -> bool {
        self.html_len() > min_chars
    }
}

/// Fetch strategy for a single URL.
///
/// An `Err` means the strategy could not produce a response at all. HTTP
/// error statuses are not errors; they come back in `FetchedPage::status`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Strategy name for logs.
    fn name(&self) -> &str;

    /// Fetch a URL, giving up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<FetchedPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausibility_threshold_is_exclusive() {
        let page = FetchedPage::new(Some("x".repeat(500)), Duration::ZERO, Some(200));
        assert!(!page.is_plausible(500));

        let page = FetchedPage::new(Some("x".repeat(501)), Duration::ZERO, Some(200));
        assert!(page.is_plausible(500));
    }

    #[test]
    fn test_missing_body_is_not_plausible() {
        let page = FetchedPage::new(None, Duration::from_millis(1500), None);
        assert_eq!(page.html_len(), 0);
        assert!(!page.is_plausible(0));
        assert_eq!(page.elapsed_secs(), 1.5);
    }
}
