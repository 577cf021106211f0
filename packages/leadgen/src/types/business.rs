//! Scraped business records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A business as produced by the maps scraper.
///
/// Immutable once created; the qualification and dedup stages only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub phone: Option<String>,

    /// Listed website, possibly without a scheme
    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(default)]
    pub review_count: Option<u32>,

    #[serde(default)]
    pub category: Option<String>,

    /// Search niche this business was scraped for
    #[serde(default)]
    pub niche: String,

    #[serde(default = "Utc::now")]
    pub scraped_at: DateTime<Utc>,
}

impl Business {
    /// Create a business with a name and city; everything else empty.
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            city: city.into(),
            country: String::new(),
            phone: None,
            website: None,
            rating: None,
            review_count: None,
            category: None,
            niche: String::new(),
            scraped_at: Utc::now(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_rating(mut self, rating: f64, review_count: u32) -> Self {
        self.rating = Some(rating);
        self.review_count = Some(review_count);
        self
    }

    pub fn with_niche(mut self, niche: impl Into<String>) -> Self {
        self.niche = niche.into();
        self
    }

    /// Website with surrounding whitespace removed, `None` when blank.
    pub fn website_url(&self) -> Option<&str> {
        self.website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_website_is_none() {
        let business = Business::new("Bob's Plumbing", "Leeds").with_website("   ");
        assert_eq!(business.website_url(), None);
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let json = r#"{"name": "Corner Cafe", "city": "Bristol", "website": "cornercafe.co.uk"}"#;
        let business: Business = serde_json::from_str(json).unwrap();

        assert_eq!(business.name, "Corner Cafe");
        assert_eq!(business.website_url(), Some("cornercafe.co.uk"));
        assert!(business.phone.is_none());
        assert!(business.niche.is_empty());
    }
}
