//! Duplicate suppression against previously tracked leads.
//!
//! Identity is exact membership of a normalized phone number or a
//! normalized `name|city` key. There is no fuzzy matching.

use std::collections::HashSet;
use tracing::{debug, info};

use crate::types::business::Business;
use crate::types::lead::TrackerRecord;

/// Fewer digits than this is not a usable phone key.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Digits of a phone number, or `None` if too short to identify anyone.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    (digits.len() >= MIN_PHONE_DIGITS).then_some(digits)
}

/// Lowercased with runs of whitespace collapsed to one space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `name|city` key; `None` unless both parts are non-blank.
pub fn name_city_key(name: &str, city: &str) -> Option<String> {
    let name = normalize_name(name);
    let city = normalize_name(city);
    if name.is_empty() || city.is_empty() {
        return None;
    }
    Some(format!("{}|{}", name, city))
}

/// Keys of every lead already known in this run.
///
/// Mutated sequentially by the pipeline driver; callers sharing one index
/// across tasks must serialize `register`.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    phones: HashSet<String>,
    name_cities: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index from existing tracker rows.
    pub fn load(&mut self, records: &[TrackerRecord]) {
        self.phones.clear();
        self.name_cities.clear();

        for record in records {
            if let Some(phone) = record.phone.as_deref().and_then(normalize_phone) {
                self.phones.insert(phone);
            }
            let name = record.business_name.as_deref().unwrap_or_default();
            let city = record.city.as_deref().unwrap_or_default();
            if let Some(key) = name_city_key(name, city) {
                self.name_cities.insert(key);
            }
        }

        info!(
            records = records.len(),
            phones = self.phones.len(),
            names = self.name_cities.len(),
            "Loaded existing leads for dedup"
        );
    }

    pub fn is_duplicate(&self, business: &Business) -> bool {
        if let Some(phone) = business.phone.as_deref().and_then(normalize_phone) {
            if self.phones.contains(&phone) {
                debug!(business = %business.name, phone = %phone, "Duplicate by phone");
                return true;
            }
        }

        if let Some(key) = name_city_key(&business.name, &business.city) {
            if self.name_cities.contains(&key) {
                debug!(business = %business.name, key = %key, "Duplicate by name and city");
                return true;
            }
        }

        false
    }

    /// Add a business's keys so later occurrences count as duplicates.
    pub fn register(&mut self, business: &Business) {
        if let Some(phone) = business.phone.as_deref().and_then(normalize_phone) {
            self.phones.insert(phone);
        }
        if let Some(key) = name_city_key(&business.name, &business.city) {
            self.name_cities.insert(key);
        }
    }

    /// Keep first-seen businesses, registering each one kept.
    pub fn filter(&mut self, businesses: Vec<Business>) -> Vec<Business> {
        self.filter_by(businesses, |business| business)
    }

    /// [`filter`](Self::filter) over items that carry a business.
    pub fn filter_by<T>(&mut self, items: Vec<T>, business: impl Fn(&T) -> &Business) -> Vec<T> {
        let total = items.len();
        let mut unique = Vec::with_capacity(total);

        for item in items {
            let candidate = business(&item);
            if self.is_duplicate(candidate) {
                continue;
            }
            self.register(candidate);
            unique.push(item);
        }

        let removed = total - unique.len();
        if removed > 0 {
            info!(removed, kept = unique.len(), "Removed {} duplicates", removed);
        }
        unique
    }

    pub fn phone_count(&self) -> usize {
        self.phones.len()
    }

    pub fn name_city_count(&self) -> usize {
        self.name_cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty() && self.name_cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(name: &str, city: &str, phone: &str) -> TrackerRecord {
        TrackerRecord {
            business_name: Some(name.to_string()).filter(|s| !s.is_empty()),
            city: Some(city.to_string()).filter(|s| !s.is_empty()),
            phone: Some(phone.to_string()).filter(|s| !s.is_empty()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+44 (113) 496-0000").as_deref(), Some("441134960000"));
        assert_eq!(normalize_phone("555-12"), None);
        assert_eq!(normalize_phone(""), None);
    }

    #[test]
    fn test_name_city_key_collapses_whitespace() {
        assert_eq!(
            name_city_key("  Sunrise   Dental ", "LEEDS").as_deref(),
            Some("sunrise dental|leeds")
        );
        assert_eq!(name_city_key("Sunrise Dental", "  "), None);
    }

    #[test]
    fn test_phone_match_is_duplicate() {
        let mut index = DedupIndex::new();
        index.load(&[record("Old Name", "York", "0113 496 0000")]);

        let business = Business::new("New Name", "Leeds").with_phone("01134960000");
        assert!(index.is_duplicate(&business));
    }

    #[test]
    fn test_name_city_match_is_duplicate() {
        let mut index = DedupIndex::new();
        index.load(&[record("Sunrise Dental", "Leeds", "")]);

        assert!(index.is_duplicate(&Business::new("sunrise  dental", "leeds")));
        assert!(!index.is_duplicate(&Business::new("Sunrise Dental", "York")));
    }

    #[test]
    fn test_blank_records_add_no_keys() {
        let mut index = DedupIndex::new();
        index.load(&[record("", "", ""), record("Name Only", "", "123")]);

        assert!(index.is_empty());
        assert!(!index.is_duplicate(&Business::new("Name Only", "")));
    }

    #[test]
    fn test_load_replaces_previous_keys() {
        let mut index = DedupIndex::new();
        index.load(&[record("First", "Leeds", "")]);
        index.load(&[record("Second", "Leeds", "")]);

        assert!(!index.is_duplicate(&Business::new("First", "Leeds")));
        assert!(index.is_duplicate(&Business::new("Second", "Leeds")));
    }

    #[test]
    fn test_filter_keeps_first_occurrence() {
        let mut index = DedupIndex::new();
        let businesses = vec![
            Business::new("Bob's Bakery", "Leeds").with_phone("0113 111 2222"),
            Business::new("Bobs Bakery Ltd", "Leeds").with_phone("01131112222"),
            Business::new("Bob's  Bakery", "LEEDS"),
            Business::new("Other Place", "Leeds"),
        ];

        let kept = index.filter(businesses);

        let names: Vec<_> = kept.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Bob's Bakery", "Other Place"]);
        assert_eq!(index.phone_count(), 1);
        assert_eq!(index.name_city_count(), 2);
    }

    fn arb_business() -> impl Strategy<Value = Business> {
        (
            prop::sample::select(vec!["Bob's Bakery", "bob's bakery", "Sunrise Dental", "", "Acme"]),
            prop::sample::select(vec!["Leeds", "LEEDS", "York", ""]),
            prop::option::of(prop::sample::select(vec![
                "0113 496 0000",
                "01134960000",
                "555",
                "+1 (212) 555-0100",
            ])),
        )
            .prop_map(|(name, city, phone)| {
                let business = Business::new(name, city);
                match phone {
                    Some(phone) => business.with_phone(phone),
                    None => business,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_filter_is_idempotent(businesses in prop::collection::vec(arb_business(), 0..12)) {
            let once = DedupIndex::new().filter(businesses);
            let twice = DedupIndex::new().filter(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_filtered_output_has_no_duplicates(businesses in prop::collection::vec(arb_business(), 0..12)) {
            let kept = DedupIndex::new().filter(businesses);
            for (i, business) in kept.iter().enumerate() {
                let mut index = DedupIndex::new();
                for earlier in &kept[..i] {
                    index.register(earlier);
                }
                prop_assert!(!index.is_duplicate(business));
            }
        }
    }
}
