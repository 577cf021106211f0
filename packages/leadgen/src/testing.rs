//! Testing utilities including mock implementations.
//!
//! These are useful for exercising qualification, personalization and
//! outreach without network, browser or model calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{
    FetchError, FetchResult, GenerationError, ScoringError, ScoringResult, TrackerError,
    TrackerResult, TransportError,
};
use crate::traits::{
    fetcher::{FetchedPage, PageFetcher},
    generator::TextGenerator,
    scorer::{ScoreRequest, VisionScorer},
    tracker::LeadTracker,
    transport::{EmailTransport, RenderedEmail},
};
use crate::types::{
    lead::{QualifiedLead, TrackerRecord},
    qualification::AiVerdict,
};

/// Elapsed time reported for canned pages.
const MOCK_ELAPSED: Duration = Duration::from_millis(50);

/// A mock page fetcher keyed by exact URL.
///
/// Unknown URLs fail with an HTTP error. Clones share state, so a test can
/// keep a handle for assertions after handing one to a `Qualifier`.
#[derive(Clone, Default)]
pub struct MockFetcher {
    /// Predefined responses by URL
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,

    /// Predefined failures by URL
    errors: Arc<RwLock<HashMap<String, String>>>,

    /// Artificial latency by URL
    delays: Arc<RwLock<HashMap<String, Duration>>>,

    /// URLs fetched, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` with status 200 for `url`.
    pub fn with_page(self, url: impl Into<String>, html: &str) -> Self {
        let page = FetchedPage::new(Some(html.to_string()), MOCK_ELAPSED, Some(200));
        self.with_response(url, page)
    }

    /// Serve an arbitrary response for `url`.
    pub fn with_response(self, url: impl Into<String>, page: FetchedPage) -> Self {
        self.pages.write().unwrap().insert(url.into(), page);
        self
    }

    /// Fail every fetch of `url`.
    pub fn with_error(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .write()
            .unwrap()
            .insert(url.into(), message.into());
        self
    }

    /// Sleep before answering for `url`.
    pub fn with_delay(self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.into(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str, _timeout: Duration) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        let delay = self.delays.read().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.errors.read().unwrap().get(url) {
            return Err(FetchError::Http(message.clone().into()));
        }

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Http(format!("no mock page for {}", url).into()))
    }
}

/// A mock vision scorer keyed by the business website as listed.
///
/// Unknown sites get a "good website" verdict.
#[derive(Clone, Default)]
pub struct MockScorer {
    verdicts: Arc<RwLock<HashMap<String, AiVerdict>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<ScoreRequest>>>,
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(self, url: impl Into<String>, verdict: AiVerdict) -> Self {
        self.verdicts.write().unwrap().insert(url.into(), verdict);
        self
    }

    pub fn with_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(url.into(), message.into());
        self
    }

    /// Sleep before answering every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<ScoreRequest> {
        self.calls.read().unwrap().clone()
    }

    fn default_verdict() -> AiVerdict {
        AiVerdict {
            design_score: 8,
            mobile_score: 8,
            professionalism_score: 8,
            cta_score: 7,
            overall_score: 8,
            needs_new_website: false,
            issues: vec![],
            summary: "Clean, modern website".to_string(),
        }
    }
}

#[async_trait]
impl VisionScorer for MockScorer {
    async fn score(&self, request: &ScoreRequest) -> ScoringResult<AiVerdict> {
        self.calls.write().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failures.read().unwrap().get(&request.url) {
            return Err(ScoringError::Request(message.clone()));
        }

        Ok(self
            .verdicts
            .read()
            .unwrap()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(Self::default_verdict))
    }
}

/// A mock text generator returning one canned answer.
#[derive(Clone, Default)]
pub struct MockGenerator {
    response: Arc<RwLock<Option<String>>>,
    failure: Arc<RwLock<Option<String>>>,
    delay: Option<Duration>,

    /// Prompts received, in call order
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        *self.response.write().unwrap() = Some(text.into());
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.failure.write().unwrap() = Some(message.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.write().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(GenerationError::Request(message));
        }

        self.response
            .read()
            .unwrap()
            .clone()
            .ok_or(GenerationError::Empty)
    }
}

/// A mock email transport that records deliveries.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Recipients whose delivery fails
    rejected: Arc<RwLock<HashMap<String, String>>>,

    sent: Arc<RwLock<Vec<(String, RenderedEmail)>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rejection(self, to: impl Into<String>, message: impl Into<String>) -> Self {
        self.rejected
            .write()
            .unwrap()
            .insert(to.into(), message.into());
        self
    }

    /// Delivered emails as `(recipient, email)`.
    pub fn sent(&self) -> Vec<(String, RenderedEmail)> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for MockTransport {
    async fn deliver(&self, to: &str, email: &RenderedEmail) -> Result<String, TransportError> {
        if let Some(message) = self.rejected.read().unwrap().get(to) {
            return Err(TransportError::Delivery(message.clone()));
        }

        let mut sent = self.sent.write().unwrap();
        sent.push((to.to_string(), email.clone()));
        Ok(format!("mock-{}", sent.len()))
    }
}

/// A tracker whose every call fails as unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTracker;

#[async_trait]
impl LeadTracker for FailingTracker {
    async fn all_records(&self) -> TrackerResult<Vec<TrackerRecord>> {
        Err(TrackerError::Unavailable("tracker offline".into()))
    }

    async fn append_leads(
        &self,
        _sheet: &str,
        _leads: &[QualifiedLead],
    ) -> TrackerResult<Vec<usize>> {
        Err(TrackerError::Unavailable("tracker offline".into()))
    }

    async fn unsent_records(&self, _sheet: &str) -> TrackerResult<Vec<(usize, TrackerRecord)>> {
        Err(TrackerError::Unavailable("tracker offline".into()))
    }

    async fn mark_email_sent(
        &self,
        _sheet: &str,
        _row: usize,
        _sent_at: DateTime<Utc>,
    ) -> TrackerResult<()> {
        Err(TrackerError::Unavailable("tracker offline".into()))
    }
}
