//! Lead tracker storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TrackerResult;
use crate::types::lead::{QualifiedLead, TrackerRecord};

/// Sheet-organized store of leads.
///
/// Row numbers are 1-based and count the header row, so the first data row
/// of a sheet is row 2.
#[async_trait]
pub trait LeadTracker: Send + Sync {
    /// Every record across every sheet, for dedup seeding.
    async fn all_records(&self) -> TrackerResult<Vec<TrackerRecord>>;

    /// Append leads to a sheet, creating it with headers if needed.
    ///
    /// Returns the row number assigned to each lead, in input order.
    async fn append_leads(
        &self,
        sheet: &str,
        leads: &[QualifiedLead],
    ) -> TrackerResult<Vec<usize>>;

    /// Records of a sheet not yet emailed, with their row numbers.
    ///
    /// A missing sheet yields an empty list.
    async fn unsent_records(&self, sheet: &str) -> TrackerResult<Vec<(usize, TrackerRecord)>>;

    /// Set the "Email Sent" and "Email Sent At" cells of a row.
    async fn mark_email_sent(
        &self,
        sheet: &str,
        row: usize,
        sent_at: DateTime<Utc>,
    ) -> TrackerResult<()>;
}
