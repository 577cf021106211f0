//! Vision scoring of website screenshots.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScoringResult;
use crate::types::business::Business;
use crate::types::qualification::AiVerdict;

/// Website to be scored, with the business context the rubric prompt uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub url: String,
    pub business_name: String,
    pub niche: String,
    pub city: String,
}

impl ScoreRequest {
    /// Build a request for a business with a website.
    pub fn for_business(business: &Business) -> Option<Self> {
        let url = business.website_url()?;
        Some(Self {
            url: url.to_string(),
            business_name: business.name.clone(),
            niche: business.niche.clone(),
            city: business.city.clone(),
        })
    }
}

/// Vision model that rates a website from a screenshot.
#[async_trait]
pub trait VisionScorer: Send + Sync {
    /// Score one website.
    ///
    /// Screenshot failures, transport errors and unparseable answers are
    /// all errors; callers decide how to degrade.
    async fn score(&self, request: &ScoreRequest) -> ScoringResult<AiVerdict>;
}
