//! Rule-based qualification of a single business.

use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::facts::PageFacts;
use super::patterns::PatternSet;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::traits::scorer::VisionScorer;
use crate::types::business::Business;
use crate::types::config::{BotWallPolicy, QualifierConfig};
use crate::types::qualification::QualificationResult;

/// Qualification engine.
///
/// Cheap to clone; batch qualification hands a clone to every task.
#[derive(Clone)]
pub struct Qualifier {
    pub(crate) fetcher: Arc<dyn PageFetcher>,
    pub(crate) scorer: Option<Arc<dyn VisionScorer>>,
    pub(crate) patterns: Arc<PatternSet>,
    pub(crate) config: QualifierConfig,
}

impl Qualifier {
    /// Create a rule-only qualifier with default config and patterns.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            scorer: None,
            patterns: Arc::new(PatternSet::default()),
            config: QualifierConfig::default(),
        }
    }

    pub fn with_config(mut self, config: QualifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = Arc::new(patterns);
        self
    }

    /// Enable the vision second pass in batch qualification.
    pub fn with_scorer(mut self, scorer: Arc<dyn VisionScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn config(&self) -> &QualifierConfig {
        &self.config
    }

    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    /// Qualify one business. Never fails: fetch problems are verdicts.
    pub async fn qualify(&self, business: &Business) -> QualificationResult {
        let Some(website) = business.website_url() else {
            return QualificationResult::new().qualify_with("No website");
        };

        let url = normalize_url(website);
        let Some(host) = site_host(&url) else {
            let mut result = QualificationResult::new().qualify_with(format!(
                "Website unreachable: invalid URL {}",
                website
            ));
            result.has_broken_layout = true;
            return result;
        };

        if let Some(social) = self.patterns.social_domain_for(&host) {
            debug!(business = %business.name, host = %host, social = %social, "Social media only");
            let mut result = QualificationResult::new().qualify_with(format!(
                "Social media only ({})",
                host
            ));
            result.is_social_only = true;
            return result;
        }

        let page = match self.fetcher.fetch(&url, self.config.timeout).await {
            Ok(page) => page,
            Err(e) => {
                debug!(business = %business.name, url = %url, error = %e, "Website unreachable");
                let mut result =
                    QualificationResult::new().qualify_with(format!("Website unreachable: {}", e));
                result.has_broken_layout = true;
                return result;
            }
        };

        debug!(
            business = %business.name,
            url = %url,
            status = ?page.status,
            elapsed_ms = page.elapsed.as_millis() as u64,
            bytes = page.html_len(),
            "Fetched website"
        );

        classify_page(&page, &self.config, &self.patterns)
    }
}

/// Verdict for a fetched page (everything after the fetch).
pub fn classify_page(
    page: &FetchedPage,
    config: &QualifierConfig,
    patterns: &PatternSet,
) -> QualificationResult {
    let mut result = QualificationResult {
        has_website: true,
        load_time_seconds: Some(page.elapsed_secs()),
        ..Default::default()
    };

    if let Some(status) = page.status.filter(|s| *s >= 400) {
        if status == 404 || status == 410 {
            result.has_broken_layout = true;
            return result.qualify_with(format!("Website broken (HTTP {})", status));
        }
        if status >= 500 {
            result.has_broken_layout = true;
            return result.qualify_with(format!("Website server error (HTTP {})", status));
        }
        if page.html_len() < config.plausible_min_chars {
            return match config.bot_wall_policy {
                BotWallPolicy::Disqualify => result.disqualify(format!(
                    "Bot-protected site (HTTP {}), likely functional",
                    status
                )),
                BotWallPolicy::TreatAsBroken => {
                    result.has_broken_layout = true;
                    result.qualify_with(format!("Website broken (HTTP {})", status))
                }
            };
        }
    }

    let html = match page.html.as_deref() {
        Some(html) if !html.trim().is_empty() => html,
        _ => {
            result.has_broken_layout = true;
            return result.qualify_with("Empty website response");
        }
    };

    let facts = PageFacts::extract(html, patterns);

    if facts.is_chain_or_franchise {
        result.is_chain_or_franchise = true;
        return result.disqualify("Large chain or franchise");
    }

    if facts.is_ecommerce {
        return result.disqualify("E-commerce store");
    }

    let load_time = page.elapsed_secs();
    if load_time > config.slow_threshold {
        result.is_slow = true;
        result.push_reason(format!("Slow loading ({:.1}s)", load_time));
    }

    if !facts.is_mobile_friendly {
        result.is_mobile_friendly = false;
        result.push_reason("Not mobile-friendly (no viewport meta)");
    }

    if facts.has_outdated_patterns {
        result.is_outdated = true;
        result.push_reason("Outdated design patterns detected");
    }

    if let Some(year) = facts.copyright_year.filter(|y| *y < config.outdated_before) {
        result.is_outdated = true;
        result.push_reason(format!("Outdated copyright year ({})", year));
    }

    result.contact_email = facts.contact_email;
    if let Some(domain) = facts.free_email_domain {
        result.uses_free_email = true;
        result.push_reason(format!("Uses free email ({})", domain));
    }

    if facts.has_broken_layout {
        result.has_broken_layout = true;
        result.push_reason("Poor design / broken layout indicators");
    }

    result.settle()
}

/// Prefix `https://` when the listed website has no scheme.
pub fn normalize_url(website: &str) -> String {
    let website = website.trim();
    if website.starts_with("http") {
        website.to_string()
    } else {
        format!("https://{}", website)
    }
}

/// Lowercased host with any leading `www.` removed.
pub fn site_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(String::from).unwrap_or(host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;
    use std::time::Duration;

    const MODERN_PAGE: &str = r#"<html><head>
        <meta name="viewport" content="width=device-width, initial-scale=1">
        <link rel="stylesheet" href="/app.css">
        </head><body><h1>Sunrise Dental</h1><p>Book online today.</p>
        <p>Contact hello@sunrisedental.co.uk</p><footer>&copy; 2024 Sunrise Dental</footer>
        </body></html>"#;

    fn page(html: &str, secs: f64, status: u16) -> FetchedPage {
        FetchedPage::new(
            Some(html.to_string()),
            Duration::from_secs_f64(secs),
            Some(status),
        )
    }

    fn classify(page: &FetchedPage) -> QualificationResult {
        classify_page(page, &QualifierConfig::default(), &PatternSet::default())
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url(" http://example.com "), "http://example.com");
    }

    #[test]
    fn test_site_host_strips_www_prefix_only() {
        assert_eq!(site_host("https://www.Example.com/a").as_deref(), Some("example.com"));
        assert_eq!(site_host("https://wwwexample.com").as_deref(), Some("wwwexample.com"));
        assert_eq!(site_host("https://"), None);
    }

    #[test]
    fn test_modern_page_is_good_website() {
        let result = classify(&page(MODERN_PAGE, 1.2, 200));

        assert!(!result.qualifies);
        assert!(result.reasons.is_empty());
        assert!(result.disqualify_reason.is_none());
        assert!(result.is_good_website());
        assert_eq!(result.contact_email.as_deref(), Some("hello@sunrisedental.co.uk"));
    }

    #[test]
    fn test_slow_page_qualifies() {
        let result = classify(&page(MODERN_PAGE, 5.3, 200));

        assert!(result.qualifies);
        assert!(result.is_slow);
        assert_eq!(result.reasons, vec!["Slow loading (5.3s)"]);
    }

    #[test]
    fn test_not_found_and_gone_are_broken() {
        for status in [404, 410] {
            let result = classify(&page("Not Found", 0.3, status));
            assert!(result.qualifies);
            assert!(result.has_broken_layout);
            assert_eq!(result.reasons, vec![format!("Website broken (HTTP {})", status)]);
        }
    }

    #[test]
    fn test_server_error_qualifies() {
        let result = classify(&page("", 0.3, 503));
        assert!(result.qualifies);
        assert_eq!(result.reasons, vec!["Website server error (HTTP 503)"]);
    }

    #[test]
    fn test_bot_wall_disqualified_by_default() {
        let result = classify(&page("Access denied", 0.3, 403));

        assert!(!result.qualifies);
        assert!(result.reasons.is_empty());
        assert_eq!(
            result.disqualify_reason.as_deref(),
            Some("Bot-protected site (HTTP 403), likely functional")
        );
    }

    #[test]
    fn test_bot_wall_can_be_treated_as_broken() {
        let config = QualifierConfig::new().with_bot_wall_policy(BotWallPolicy::TreatAsBroken);
        let result = classify_page(&page("Access denied", 0.3, 403), &config, &PatternSet::default());

        assert!(result.qualifies);
        assert!(result.disqualify_reason.is_none());
        assert_eq!(result.reasons, vec!["Website broken (HTTP 403)"]);
    }

    #[test]
    fn test_long_4xx_body_is_classified_normally() {
        let html = MODERN_PAGE.replace(
            "<p>Book online today.</p>",
            &"<p>Book online today.</p>".repeat(30),
        );
        let result = classify(&page(&html, 0.5, 403));
        assert!(result.disqualify_reason.is_none());
        assert!(!result.qualifies);
    }

    #[test]
    fn test_empty_body_qualifies() {
        let empty = FetchedPage::new(None, Duration::from_millis(200), None);
        let result = classify(&empty);

        assert!(result.qualifies);
        assert!(result.has_broken_layout);
        assert_eq!(result.reasons, vec!["Empty website response"]);
    }

    #[test]
    fn test_ecommerce_disqualifies() {
        let html = MODERN_PAGE.replace("Book online today.", "Add to cart. View cart.");
        let result = classify(&page(&html, 6.0, 200));

        assert!(!result.qualifies);
        assert_eq!(result.disqualify_reason.as_deref(), Some("E-commerce store"));
        assert!(result.reasons.is_empty());
    }

    #[tokio::test]
    async fn test_no_website_qualifies() {
        let qualifier = Qualifier::new(Arc::new(MockFetcher::new()));
        let result = qualifier.qualify(&Business::new("Bob's Bakery", "Leeds")).await;

        assert!(result.qualifies);
        assert_eq!(result.reasons, vec!["No website"]);
        assert!(!result.has_website);
    }

    #[tokio::test]
    async fn test_social_subdomain_qualifies_without_fetch() {
        let fetcher = Arc::new(MockFetcher::new());
        let qualifier = Qualifier::new(fetcher.clone());
        let business =
            Business::new("Bob's Bakery", "Leeds").with_website("https://m.facebook.com/bobsbakery");

        let result = qualifier.qualify(&business).await;

        assert!(result.qualifies);
        assert!(result.is_social_only);
        assert_eq!(result.reasons, vec!["Social media only (m.facebook.com)"]);
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_is_unreachable() {
        let fetcher = MockFetcher::new().with_error("https://bobsbakery.com", "connection refused");
        let qualifier = Qualifier::new(Arc::new(fetcher));
        let business = Business::new("Bob's Bakery", "Leeds").with_website("bobsbakery.com");

        let result = qualifier.qualify(&business).await;

        assert!(result.qualifies);
        assert!(result.has_broken_layout);
        assert!(!result.has_website);
        assert!(result.reasons[0].starts_with("Website unreachable:"));
    }
}
