//! Heuristic pattern tables.
//!
//! Every classification heuristic is a table of plain strings plus a named
//! threshold. [`PatternTables`] is the serializable source form;
//! [`PatternSet`] is the compiled form the engine matches with.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outdated-markup patterns that must match before a page counts as outdated.
pub const OUTDATED_MIN_MATCHES: usize = 3;

/// E-commerce indicators that must match before a page counts as a store.
pub const ECOMMERCE_MIN_MATCHES: usize = 2;

/// More location-finder links than this marks a chain.
pub const LOCATION_LINK_MAX: usize = 3;

/// Broken images (among the scanned ones) that flag a broken layout.
pub const BROKEN_IMAGE_MIN: usize = 5;

/// Only the first images of a page are inspected.
pub const IMAGE_SCAN_LIMIT: usize = 20;

/// Pages longer than this with no styling signal count as unstyled.
pub const UNSTYLED_MIN_CHARS: usize = 2000;

/// Inline `data:` image sources shorter than this are placeholders.
pub const PLACEHOLDER_DATA_URI_MAX: usize = 50;

/// Source form of every heuristic table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTables {
    /// Hosts that mean "social media page, not a website" (subdomains match)
    pub social_domains: Vec<String>,

    pub free_email_domains: Vec<String>,

    /// Regexes; any single match marks a chain or franchise
    pub chain_indicators: Vec<String>,

    /// Regex matched against `<a href>` values of location finders
    pub location_link: String,

    /// Regexes; `ECOMMERCE_MIN_MATCHES` distinct matches mark a store
    pub ecommerce_indicators: Vec<String>,

    /// Regexes; `OUTDATED_MIN_MATCHES` distinct matches mark legacy markup
    pub outdated_patterns: Vec<String>,

    /// Regexes; any match means the page is responsive
    pub mobile_markers: Vec<String>,

    /// Regex whose first group captures a copyright year
    pub copyright_year: String,

    pub email: String,

    /// Substrings that rule out a found address as a contact email
    pub email_skip: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PatternTables {
    fn default() -> Self {
        Self {
            social_domains: strings(&[
                "facebook.com",
                "fb.com",
                "instagram.com",
                "twitter.com",
                "x.com",
                "tiktok.com",
                "linkedin.com",
                "youtube.com",
                "yelp.com",
            ]),
            free_email_domains: strings(&[
                "gmail.com",
                "yahoo.com",
                "yahoo.co.uk",
                "hotmail.com",
                "outlook.com",
                "aol.com",
                "icloud.com",
                "mail.com",
                "protonmail.com",
                "ymail.com",
                "live.com",
                "msn.com",
                "comcast.net",
                "att.net",
                "verizon.net",
            ]),
            chain_indicators: strings(&[
                "franchise opportunities",
                "become a franchisee",
                "franchise info",
                "nationwide locations",
                "locations across",
                r"over \d+ locations",
                r"\d{3,}\+ locations",
                "find a location near you",
                "store locator",
                "corporate headquarters",
                "corporate office",
            ]),
            location_link: "location|store-finder|branches".to_string(),
            ecommerce_indicators: strings(&[
                "add to cart",
                "shopping cart",
                "shopify",
                "woocommerce",
                "bigcommerce",
                "magento",
                "add to bag",
                "view cart",
                "my cart",
                "cart total",
            ]),
            outdated_patterns: strings(&[
                r"<font\s",
                r"<center>",
                r"<marquee",
                r"<blink",
                r"<frameset",
                r"<frame\s",
                r"\.swf",
                r"best viewed in",
                r"optimized for internet explorer",
                r"<table[^>]*bgcolor",
                r"<body[^>]*bgcolor",
                r#"<img[^>]*border\s*=\s*["']?\d"#,
                r"<hr[^>]*noshade",
            ]),
            mobile_markers: strings(&[
                r#"<meta[^>]*name=["']viewport["'][^>]*content=["'][^"']*width=device-width"#,
                r#"<meta[^>]*content=["'][^"']*width=device-width[^>]*name=["']viewport["']"#,
                r"@media\s*\(",
                r"@media\s+screen\s+and\s*\(\s*max-width",
            ]),
            copyright_year: r"(?:©|&copy;|copyright)\s*(?:\d{4}\s*[-–]\s*)?(\d{4})".to_string(),
            email: r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}".to_string(),
            email_skip: strings(&[
                "noreply",
                "no-reply",
                "info@example",
                "user@example",
                "email@example",
                "support@wordpress",
                "wix.com",
            ]),
        }
    }
}

/// Compiled heuristic tables.
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub social_domains: Vec<String>,
    pub free_email_domains: Vec<String>,
    pub chain_indicators: Vec<Regex>,
    pub location_link: Regex,
    pub ecommerce_indicators: Vec<Regex>,
    pub outdated_patterns: Vec<Regex>,
    pub mobile_markers: Vec<Regex>,
    pub copyright_year: Regex,
    pub email: Regex,
    pub email_skip: Vec<String>,
}

fn insensitive(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn insensitive_all(patterns: &[String]) -> std::result::Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| insensitive(p)).collect()
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.trim().to_lowercase()).collect()
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::compile(&PatternTables::default()).expect("built-in patterns are valid")
    }
}

impl PatternSet {
    /// Compile a set of tables. All matching except `email` is case-insensitive.
    pub fn compile(tables: &PatternTables) -> Result<Self> {
        Ok(Self {
            social_domains: lowercase_all(&tables.social_domains),
            free_email_domains: lowercase_all(&tables.free_email_domains),
            chain_indicators: insensitive_all(&tables.chain_indicators)?,
            location_link: insensitive(&tables.location_link)?,
            ecommerce_indicators: insensitive_all(&tables.ecommerce_indicators)?,
            outdated_patterns: insensitive_all(&tables.outdated_patterns)?,
            mobile_markers: insensitive_all(&tables.mobile_markers)?,
            copyright_year: insensitive(&tables.copyright_year)?,
            email: Regex::new(&tables.email)?,
            email_skip: lowercase_all(&tables.email_skip),
        })
    }

    /// Social domain matching `host` exactly or as a parent domain.
    pub fn social_domain_for(&self, host: &str) -> Option<&str> {
        self.social_domains
            .iter()
            .find(|social| {
                host == social.as_str()
                    || host
                        .strip_suffix(social.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            })
            .map(String::as_str)
    }

    pub fn is_free_email_domain(&self, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        self.free_email_domains.iter().any(|d| *d == domain)
    }
}

/// Number of patterns with at least one match.
pub(crate) fn count_matching(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|p| p.is_match(text)).count()
}
