//! Signals derived from fetched page HTML.
//!
//! Pure and synchronous. Malformed HTML never fails: the parser recovers
//! and a heuristic that finds nothing reports "no signal".

use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::patterns::{
    count_matching, PatternSet, BROKEN_IMAGE_MIN, ECOMMERCE_MIN_MATCHES, IMAGE_SCAN_LIMIT,
    LOCATION_LINK_MAX, OUTDATED_MIN_MATCHES, PLACEHOLDER_DATA_URI_MAX, UNSTYLED_MIN_CHARS,
};

static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("valid selector"));
static LINK_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static STYLESHEET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel~="stylesheet"]"#).expect("valid selector"));

/// Lazy-load attributes that excuse an image without `src`.
const LAZY_ATTRS: [&str; 3] = ["data-src", "data-lazy", "loading"];

/// Substrings left behind by CSS-in-JS and CSS modules.
const GENERATED_CSS_MARKERS: [&str; 4] = ["css-", "_css", "sc-", "styled-"];

/// Everything the rule engine needs to know about one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    pub is_chain_or_franchise: bool,
    pub is_ecommerce: bool,
    pub is_mobile_friendly: bool,
    pub has_outdated_patterns: bool,

    /// Last copyright year on the page
    pub copyright_year: Option<i32>,

    pub contact_email: Option<String>,

    /// Domain of `contact_email` when it is a free provider
    pub free_email_domain: Option<String>,

    pub has_broken_layout: bool,
}

impl PageFacts {
    pub fn extract(html: &str, patterns: &PatternSet) -> Self {
        let document = Html::parse_document(html);
        let html_lower = html.to_lowercase();

        let contact_email = find_contact_email(html, patterns);
        let free_email_domain = contact_email
            .as_deref()
            .and_then(|email| email.rsplit_once('@'))
            .map(|(_, domain)| domain.to_lowercase())
            .filter(|domain| patterns.is_free_email_domain(domain));

        Self {
            is_chain_or_franchise: is_chain_or_franchise(&document, html, patterns),
            is_ecommerce: count_matching(&patterns.ecommerce_indicators, html)
                >= ECOMMERCE_MIN_MATCHES,
            is_mobile_friendly: patterns.mobile_markers.iter().any(|p| p.is_match(html)),
            has_outdated_patterns: count_matching(&patterns.outdated_patterns, html)
                >= OUTDATED_MIN_MATCHES,
            copyright_year: copyright_year(html, patterns),
            contact_email,
            free_email_domain,
            has_broken_layout: has_broken_images(&document) || is_unstyled(&document, &html_lower),
        }
    }
}

fn is_chain_or_franchise(document: &Html, html: &str, patterns: &PatternSet) -> bool {
    if patterns.chain_indicators.iter().any(|p| p.is_match(html)) {
        return true;
    }

    let location_links = document
        .select(&LINK_HREF)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| patterns.location_link.is_match(href))
        .count();

    location_links > LOCATION_LINK_MAX
}

fn copyright_year(html: &str, patterns: &PatternSet) -> Option<i32> {
    patterns
        .copyright_year
        .captures_iter(html)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|year| year.as_str().parse().ok())
}

fn find_contact_email(html: &str, patterns: &PatternSet) -> Option<String> {
    patterns
        .email
        .find_iter(html)
        .map(|m| m.as_str())
        .find(|email| {
            let lower = email.to_lowercase();
            email.len() > 6 && !patterns.email_skip.iter().any(|skip| lower.contains(skip))
        })
        .map(String::from)
}

fn has_broken_images(document: &Html) -> bool {
    let broken = document
        .select(&IMG)
        .take(IMAGE_SCAN_LIMIT)
        .filter(|img| {
            let element = img.value();
            let src = element.attr("src").unwrap_or("");
            let missing_src = src.is_empty()
                || (src.starts_with("data:") && src.len() < PLACEHOLDER_DATA_URI_MAX);
            let lazy = LAZY_ATTRS
                .iter()
                .any(|attr| element.attr(attr).is_some_and(|v| !v.is_empty()));
            missing_src && !lazy
        })
        .count();

    broken >= BROKEN_IMAGE_MIN
}

fn is_unstyled(document: &Html, html_lower: &str) -> bool {
    let has_stylesheet = document.select(&STYLESHEET).next().is_some();
    let has_inline_style = html_lower.contains("<style");
    let has_generated_css = GENERATED_CSS_MARKERS.iter().any(|m| html_lower.contains(m));

    !has_stylesheet
        && !has_inline_style
        && !has_generated_css
        && html_lower.chars().count() > UNSTYLED_MIN_CHARS
}
