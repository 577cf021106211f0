//! Lead rows written to and read back from the tracker.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::business::Business;
use super::qualification::QualificationResult;

/// Tracker column headers, in row order.
pub const SHEET_HEADERS: [&str; 17] = [
    "Business Name",
    "Address",
    "City",
    "Country",
    "Niche",
    "Phone",
    "Website",
    "Rating",
    "Review Count",
    "Contact Email",
    "Qualification Reasons",
    "Email Sent",
    "Email Sent At",
    "Added By",
    "Added At",
    "AI Score",
    "AI Summary",
];

/// A business that passed qualification and deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedLead {
    pub name: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub niche: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub contact_email: Option<String>,

    /// Comma-joined qualification reasons
    pub qualification_reasons: String,

    pub ai_score: Option<u8>,
    pub ai_design_score: Option<u8>,
    pub ai_mobile_score: Option<u8>,
    pub ai_professionalism_score: Option<u8>,
    pub ai_cta_score: Option<u8>,
    pub ai_summary: String,
    pub ai_issues: Vec<String>,

    pub email_sent: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

impl QualifiedLead {
    /// Fold a business and its verdict into a lead row.
    pub fn from_parts(
        business: &Business,
        result: &QualificationResult,
        added_by: impl Into<String>,
    ) -> Self {
        Self {
            name: business.name.clone(),
            address: business.address.clone(),
            city: business.city.clone(),
            country: business.country.clone(),
            niche: business.niche.clone(),
            phone: business.phone.clone(),
            website: business.website.clone(),
            rating: business.rating,
            review_count: business.review_count,
            contact_email: result.contact_email.clone(),
            qualification_reasons: result.reasons_text(),
            ai_score: result.ai_score,
            ai_design_score: result.ai_design_score,
            ai_mobile_score: result.ai_mobile_score,
            ai_professionalism_score: result.ai_professionalism_score,
            ai_cta_score: result.ai_cta_score,
            ai_summary: result.ai_summary.clone().unwrap_or_default(),
            ai_issues: result.ai_issues.clone(),
            email_sent: false,
            email_sent_at: None,
            added_by: added_by.into(),
            added_at: Utc::now(),
        }
    }

    /// Contact address, if it looks deliverable.
    pub fn email(&self) -> Option<&str> {
        self.contact_email
            .as_deref()
            .map(str::trim)
            .filter(|e| e.contains('@'))
    }

    /// Cells in `SHEET_HEADERS` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.address.clone(),
            self.city.clone(),
            self.country.clone(),
            self.niche.clone(),
            self.phone.clone().unwrap_or_default(),
            self.website.clone().unwrap_or_default(),
            self.rating
                .filter(|r| *r != 0.0)
                .map(|r| r.to_string())
                .unwrap_or_default(),
            self.review_count
                .filter(|c| *c != 0)
                .map(|c| c.to_string())
                .unwrap_or_default(),
            self.contact_email.clone().unwrap_or_default(),
            self.qualification_reasons.clone(),
            if self.email_sent { "Yes" } else { "No" }.to_string(),
            self.email_sent_at.map(format_timestamp).unwrap_or_default(),
            self.added_by.clone(),
            format_timestamp(self.added_at),
            self.ai_score
                .map(|s| format!("{}/10", s))
                .unwrap_or_default(),
            self.ai_summary.clone(),
        ]
    }

    /// Header row for a new sheet.
    pub fn sheet_headers() -> Vec<String> {
        SHEET_HEADERS.iter().map(|h| h.to_string()).collect()
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A previously written tracker row.
///
/// Every field is optional: rows come from a human-edited spreadsheet, so
/// blank or missing cells are `None` rather than errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerRecord {
    pub business_name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub niche: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub qualification_reasons: Option<String>,
    pub email_sent: bool,
    pub email_sent_at: Option<String>,
    pub ai_score: Option<String>,
    pub ai_summary: Option<String>,
}

impl TrackerRecord {
    /// Read a row keyed by column header.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            fields
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        Self {
            business_name: get("Business Name"),
            city: get("City"),
            phone: get("Phone"),
            niche: get("Niche"),
            website: get("Website"),
            contact_email: get("Contact Email"),
            qualification_reasons: get("Qualification Reasons"),
            email_sent: get("Email Sent").is_some_and(|v| v == "Yes"),
            email_sent_at: get("Email Sent At"),
            ai_score: get("AI Score"),
            ai_summary: get("AI Summary"),
        }
    }

    /// Overall AI score parsed from `"N/10"`.
    pub fn ai_score(&self) -> Option<u8> {
        self.ai_score
            .as_deref()?
            .trim_end_matches("/10")
            .trim()
            .parse()
            .ok()
    }

    /// Contact address, if it looks deliverable.
    pub fn email(&self) -> Option<&str> {
        self.contact_email.as_deref().filter(|e| e.contains('@'))
    }
}
