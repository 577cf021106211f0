//! Local Business Lead Qualification and Outreach
//!
//! Takes scraped business listings, decides which ones are worth a web design
//! pitch, drops the ones already being tracked, and writes pitches that never
//! claim something the lead's own facts contradict.
//!
//! # Pipeline
//!
//! 1. **Qualify** - fetch each website and run the rule pass (no website,
//!    social-only, outdated markup, missing viewport, chains), optionally
//!    followed by a vision score of the screenshot
//! 2. **Dedup** - phone and name|city keys against everything in the tracker
//! 3. **Track** - append new leads to today's sheet
//! 4. **Personalize** - fact sheet, generated pitch, contradiction guard,
//!    deterministic fallback
//! 5. **Send** - template rendering under a daily quota
//!
//! # Usage
//!
//! ```rust,ignore
//! use leadgen::{Business, MemoryTracker, Pipeline, Qualifier};
//! use leadgen::testing::MockFetcher;
//! use tokio_util::sync::CancellationToken;
//!
//! let fetcher = MockFetcher::new().with_page("https://bobsbakery.com", html);
//! let qualifier = Qualifier::new(Arc::new(fetcher));
//! let tracker = Arc::new(MemoryTracker::new());
//!
//! let mut pipeline = Pipeline::new(qualifier, tracker);
//! let stats = pipeline.run(&businesses, CancellationToken::new()).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams to external collaborators (fetcher, scorer, generator, tracker, transport)
//! - [`types`] - Businesses, qualification results, tracker rows and config
//! - [`qualify`] - Rule engine, batch fan-out and vision second pass
//! - [`fetchers`] - Browser, plain HTTP and fallback fetch strategies
//! - [`dedup`] - Phone and name|city duplicate detection
//! - [`personalize`] - Fact-guarded pitch generation
//! - [`outreach`] - Email templates, quota and sending
//! - [`stores`] - Tracker implementations
//! - [`pipeline`] - End-to-end driver
//! - [`testing`] - Mock implementations for testing

pub mod dedup;
pub mod error;
pub mod fetchers;
pub mod outreach;
pub mod personalize;
pub mod pipeline;
pub mod qualify;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{
    FetchError, GenerationError, LeadgenError, OutreachError, Result, ScoringError, TrackerError,
    TransportError,
};
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    generator::TextGenerator,
    scorer::{ScoreRequest, VisionScorer},
    tracker::LeadTracker,
    transport::{EmailTransport, RenderedEmail},
};
pub use types::{
    business::Business,
    config::{BotWallPolicy, OutreachConfig, PersonalizerConfig, QualifierConfig},
    lead::{QualifiedLead, TrackerRecord},
    qualification::{AiVerdict, QualificationResult},
};

// Qualification
pub use qualify::{PatternSet, QualifiedBatch, Qualifier};

// Fetch strategies
pub use fetchers::{BrowserFetcher, FallbackFetcher, HttpFetcher};

// Dedup
pub use dedup::DedupIndex;

// Personalization
pub use personalize::{
    fallback_pitch, validate_pitch, FactSheet, Personalizer, Pitch, PitchContext, PitchSource,
};

// Outreach
pub use outreach::{DailyQuota, EmailTemplate, LogTransport, OutreachLead, OutreachSender, SentEmail};

// Stores
pub use stores::{MemoryTracker, SheetData};

// Pipeline
pub use pipeline::{today_sheet, Pipeline, PipelineStats};

// Re-export testing utilities
pub use testing::{FailingTracker, MockFetcher, MockGenerator, MockScorer, MockTransport};
