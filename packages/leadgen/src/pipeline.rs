//! Scrape-to-outreach pipeline driver.
//!
//! Qualifies a batch, drops anything already tracked, writes the new leads
//! to today's sheet and optionally emails them.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dedup::DedupIndex;
use crate::error::Result;
use crate::outreach::{OutreachLead, OutreachSender};
use crate::qualify::Qualifier;
use crate::traits::tracker::LeadTracker;
use crate::types::business::Business;
use crate::types::lead::QualifiedLead;

/// Counts for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub scraped: usize,
    pub qualified: usize,
    pub duplicates_removed: usize,
    pub added: usize,
    pub emails_sent: usize,
    pub errors: Vec<String>,
    pub cancelled: bool,
}

/// Sheet name for today's leads, e.g. `"Mar 03"`.
pub fn today_sheet() -> String {
    Local::now().format("%b %d").to_string()
}

pub struct Pipeline {
    qualifier: Qualifier,
    tracker: Arc<dyn LeadTracker>,
    sender: Option<OutreachSender>,
    added_by: String,
}

impl Pipeline {
    pub fn new(qualifier: Qualifier, tracker: Arc<dyn LeadTracker>) -> Self {
        Self {
            qualifier,
            tracker,
            sender: None,
            added_by: "Leadgen".to_string(),
        }
    }

    /// Email new leads after writing them.
    pub fn with_sender(mut self, sender: OutreachSender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_added_by(mut self, added_by: impl Into<String>) -> Self {
        self.added_by = added_by.into();
        self
    }

    pub fn sender_mut(&mut self) -> Option<&mut OutreachSender> {
        self.sender.as_mut()
    }

    /// Run into today's sheet.
    pub async fn run(&mut self, businesses: &[Business], cancel: CancellationToken) -> PipelineStats {
        let sheet = today_sheet();
        self.run_into(&sheet, businesses, cancel).await
    }

    /// Run into a named sheet.
    pub async fn run_into(
        &mut self,
        sheet: &str,
        businesses: &[Business],
        cancel: CancellationToken,
    ) -> PipelineStats {
        let mut stats = PipelineStats {
            scraped: businesses.len(),
            ..Default::default()
        };

        info!(total = businesses.len(), "Qualifying businesses");
        let batch = self
            .qualifier
            .qualify_batch_with_cancel(businesses, cancel.clone())
            .await;

        if batch.cancelled {
            warn!(completed = batch.results.len(), "Pipeline cancelled before writing leads");
            stats.cancelled = true;
            stats.qualified = batch.qualified_count();
            return stats;
        }

        let qualified = batch.into_qualified();
        stats.qualified = qualified.len();
        info!(qualified = stats.qualified, scraped = stats.scraped, "Qualification finished");

        if qualified.is_empty() {
            info!("No qualified leads found");
            return stats;
        }

        let mut index = DedupIndex::new();
        match self.tracker.all_records().await {
            Ok(records) => index.load(&records),
            Err(e) => {
                warn!(error = %e, "Could not load existing leads, proceeding without dedup against tracker");
            }
        }

        let unique = index.filter_by(qualified, |(business, _)| business);
        stats.duplicates_removed = stats.qualified - unique.len();
        info!(
            unique = unique.len(),
            removed = stats.duplicates_removed,
            "Deduplication finished"
        );

        if unique.is_empty() {
            info!("All qualified leads already exist in tracker");
            return stats;
        }

        let leads: Vec<QualifiedLead> = unique
            .iter()
            .map(|(business, result)| QualifiedLead::from_parts(business, result, &self.added_by))
            .collect();

        let rows = match self.tracker.append_leads(sheet, &leads).await {
            Ok(rows) => {
                stats.added = rows.len();
                info!(added = stats.added, sheet = %sheet, "Added leads to sheet");
                rows
            }
            Err(e) => {
                warn!(error = %e, sheet = %sheet, "Failed to write leads");
                stats.errors.push(format!("Tracker write error: {}", e));
                return stats;
            }
        };

        if self.sender.is_some() && !cancel.is_cancelled() {
            let pending = rows
                .into_iter()
                .zip(leads.iter().map(OutreachLead::from))
                .collect();
            stats.emails_sent = self.send_and_mark(sheet, pending).await;
        }

        info!(
            scraped = stats.scraped,
            qualified = stats.qualified,
            duplicates = stats.duplicates_removed,
            added = stats.added,
            emailed = stats.emails_sent,
            errors = stats.errors.len(),
            "Pipeline complete"
        );
        stats
    }

    /// Email every unsent lead of `sheet` that has an address, marking
    /// each delivered row as sent.
    ///
    /// Leads read back from the tracker carry only the overall AI score and
    /// summary, so this is for runs that email an existing sheet.
    pub async fn send_pending(&mut self, sheet: &str) -> Result<usize> {
        if self.sender.is_none() {
            warn!("Outreach not configured, no emails sent");
            return Ok(0);
        }

        let pending = self
            .tracker
            .unsent_records(sheet)
            .await?
            .iter()
            .map(|(row, record)| (*row, OutreachLead::from(record)))
            .collect();

        Ok(self.send_and_mark(sheet, pending).await)
    }

    /// Send to every lead with an address and mark its row sent.
    async fn send_and_mark(&mut self, sheet: &str, pending: Vec<(usize, OutreachLead)>) -> usize {
        let Some(sender) = self.sender.as_mut() else {
            return 0;
        };

        let (rows, leads): (Vec<usize>, Vec<OutreachLead>) = pending
            .into_iter()
            .filter(|(_, lead)| lead.address().is_some())
            .unzip();

        if leads.is_empty() {
            info!(sheet = %sheet, "No unsent leads with contact emails");
            return 0;
        }

        let results = sender.send_batch(&leads).await;

        let mut sent = 0;
        for (row, result) in rows.into_iter().zip(results) {
            if result.is_err() {
                continue;
            }
            sent += 1;
            if let Err(e) = self.tracker.mark_email_sent(sheet, row, Utc::now()).await {
                warn!(error = %e, sheet = %sheet, row, "Email sent but row could not be marked");
            }
        }

        info!(sent, sheet = %sheet, "Outreach finished");
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outreach::EmailTemplate;
    use crate::personalize::Personalizer;
    use crate::stores::MemoryTracker;
    use crate::testing::{FailingTracker, MockFetcher, MockGenerator, MockScorer, MockTransport};
    use crate::types::config::OutreachConfig;
    use crate::types::lead::TrackerRecord;
    use crate::types::qualification::AiVerdict;
    use std::time::Duration;

    const OUTDATED: &str = r#"<html><body><center><font face="Arial">Bob's Bakery</font></center>
        <marquee>Fresh bread daily</marquee><p>bob@gmail.com</p><p>&copy; 2015</p></body></html>"#;

    const MODERN: &str = r#"<html><head><meta name="viewport" content="width=device-width">
        <link rel="stylesheet" href="/site.css"></head>
        <body><h1>Harbour Physio</h1><p>hello@harbourphysio.co.uk</p>
        <footer>&copy; 2025</footer></body></html>"#;

    fn qualifier() -> Qualifier {
        Qualifier::new(Arc::new(
            MockFetcher::new().with_page("https://bobsbakery.com", OUTDATED),
        ))
    }

    fn businesses() -> Vec<Business> {
        vec![
            Business::new("Bob's Bakery", "Leeds")
                .with_website("bobsbakery.com")
                .with_phone("0113 000 0001"),
            Business::new("No Site Cafe", "Leeds").with_phone("0113 000 0002"),
            Business::new("No Site Cafe", "Leeds"),
        ]
    }

    fn sender(transport: Arc<MockTransport>) -> OutreachSender {
        OutreachSender::new(
            Personalizer::default(),
            transport,
            EmailTemplate::parse("Subject: Hi {{Business Name}}\n\n{{personalized_pitch}}"),
            OutreachConfig::new().with_delay(Duration::ZERO, Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_run_dedups_and_writes() {
        let tracker = Arc::new(MemoryTracker::new());
        let mut pipeline = Pipeline::new(qualifier(), tracker.clone());

        let stats = pipeline
            .run_into("Mar 03", &businesses(), CancellationToken::new())
            .await;

        assert_eq!(stats.scraped, 3);
        assert_eq!(stats.qualified, 3);
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(stats.added, 2);
        assert_eq!(stats.emails_sent, 0);
        assert!(stats.errors.is_empty());
        assert_eq!(tracker.row_count("Mar 03"), 2);

        // A second run finds everything already tracked
        let stats = pipeline
            .run_into("Mar 04", &businesses(), CancellationToken::new())
            .await;
        assert_eq!(stats.duplicates_removed, 3);
        assert_eq!(stats.added, 0);
    }

    #[tokio::test]
    async fn test_run_sends_and_marks() {
        let tracker = Arc::new(MemoryTracker::new());
        let transport = Arc::new(MockTransport::new());
        let mut pipeline =
            Pipeline::new(qualifier(), tracker.clone()).with_sender(sender(transport.clone()));

        let stats = pipeline
            .run_into("Mar 03", &businesses(), CancellationToken::new())
            .await;

        assert_eq!(stats.emails_sent, 1);
        let sent = transport.sent();
        assert_eq!(sent[0].0, "bob@gmail.com");
        assert_eq!(sent[0].1.subject, "Hi Bob's Bakery");

        let unsent = tracker.unsent_records("Mar 03").await.unwrap();
        let names: Vec<_> = unsent
            .iter()
            .filter_map(|(_, r)| r.business_name.as_deref())
            .collect();
        assert_eq!(names, vec!["No Site Cafe"]);
    }

    #[tokio::test]
    async fn test_run_pitches_with_ai_sub_scores() {
        let fetcher = MockFetcher::new().with_page("https://harbourphysio.com", MODERN);
        let scorer = MockScorer::new().with_verdict(
            "harbourphysio.com",
            AiVerdict {
                design_score: 3,
                mobile_score: 3,
                professionalism_score: 6,
                cta_score: 6,
                overall_score: 6,
                needs_new_website: true,
                issues: vec![],
                summary: "Desktop-only layout".to_string(),
            },
        );
        let qualifier = Qualifier::new(Arc::new(fetcher)).with_scorer(Arc::new(scorer));

        let tracker = Arc::new(MemoryTracker::new());
        let transport = Arc::new(MockTransport::new());
        let generator = MockGenerator::new()
            .with_response("Your site is not mobile friendly, so phone visitors drop off before booking.");
        let sender = OutreachSender::new(
            Personalizer::default().with_generator(Arc::new(generator)),
            transport.clone(),
            EmailTemplate::parse("Subject: Hi {{Business Name}}\n\n{{personalized_pitch}}"),
            OutreachConfig::new().with_delay(Duration::ZERO, Duration::ZERO),
        );
        let mut pipeline = Pipeline::new(qualifier, tracker.clone()).with_sender(sender);

        let businesses =
            vec![Business::new("Harbour Physio", "Leeds").with_website("harbourphysio.com")];
        let stats = pipeline
            .run_into("Mar 03", &businesses, CancellationToken::new())
            .await;

        assert_eq!(stats.added, 1);
        assert_eq!(stats.emails_sent, 1);

        // Mobile score of 3 verifies the mobile claim, so the generated pitch is kept
        let sent = transport.sent();
        assert_eq!(sent[0].0, "hello@harbourphysio.co.uk");
        assert!(sent[0].1.text.contains("not mobile friendly"));
        assert!(tracker.unsent_records("Mar 03").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_only_emails_new_leads() {
        let tracker = Arc::new(MemoryTracker::new());
        let transport = Arc::new(MockTransport::new());

        // Written by an earlier run without outreach
        let mut quiet = Pipeline::new(qualifier(), tracker.clone());
        quiet
            .run_into("Mar 03", &businesses()[..1], CancellationToken::new())
            .await;

        let mut pipeline =
            Pipeline::new(qualifier(), tracker.clone()).with_sender(sender(transport.clone()));
        let stats = pipeline
            .run_into("Mar 03", &businesses()[1..], CancellationToken::new())
            .await;

        assert_eq!(stats.added, 1);
        assert_eq!(stats.emails_sent, 0);
        assert!(transport.sent().is_empty());

        // The older row is still left for an email-only run
        let sent = pipeline.send_pending("Mar 03").await.unwrap();
        assert_eq!(sent, 1);
        assert_eq!(transport.sent()[0].0, "bob@gmail.com");
    }

    #[tokio::test]
    async fn test_tracker_failure_degrades() {
        let mut pipeline = Pipeline::new(qualifier(), Arc::new(FailingTracker));

        let stats = pipeline
            .run_into("Mar 03", &businesses(), CancellationToken::new())
            .await;

        // Intra-batch dedup still applies without tracker context
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(stats.added, 0);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].starts_with("Tracker write error"));
    }

    #[tokio::test]
    async fn test_send_pending_skips_sent_and_addressless_rows() {
        let tracker = Arc::new(MemoryTracker::new());
        let transport = Arc::new(MockTransport::new());
        let mut pipeline =
            Pipeline::new(qualifier(), tracker.clone()).with_sender(sender(transport.clone()));

        pipeline
            .run_into("Mar 03", &businesses(), CancellationToken::new())
            .await;
        let sent_again = pipeline.send_pending("Mar 03").await.unwrap();

        assert_eq!(sent_again, 0);
        assert_eq!(transport.sent().len(), 1);

        let records: Vec<TrackerRecord> = tracker.all_records().await.unwrap();
        assert!(records.iter().any(|r| r.email_sent && r.email_sent_at.is_some()));
    }

    #[tokio::test]
    async fn test_cancelled_run_writes_nothing() {
        let tracker = Arc::new(MemoryTracker::new());
        let mut pipeline = Pipeline::new(qualifier(), tracker.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = pipeline.run_into("Mar 03", &businesses(), cancel).await;

        assert!(stats.cancelled);
        assert_eq!(stats.added, 0);
        assert!(tracker.sheet_names().is_empty());
    }
}
