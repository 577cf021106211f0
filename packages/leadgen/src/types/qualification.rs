//! Qualification verdicts and AI vision verdicts.

use serde::{Deserialize, Serialize};

/// Verdict for a single business website.
///
/// `qualifies` is true iff `reasons` is non-empty or a terminal fetch
/// condition (unreachable, 404/410/5xx, empty body) fired. A set
/// `disqualify_reason` always implies `qualifies == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationResult {
    pub qualifies: bool,

    /// Positive signals in detection order; AI reasons are appended last
    pub reasons: Vec<String>,

    /// Hard-disqualify reason (chain, e-commerce, bot wall)
    pub disqualify_reason: Option<String>,

    pub has_website: bool,
    pub is_mobile_friendly: bool,
    pub load_time_seconds: Option<f64>,
    pub is_slow: bool,
    pub is_outdated: bool,
    pub is_social_only: bool,
    pub uses_free_email: bool,
    pub has_broken_layout: bool,
    pub is_chain_or_franchise: bool,
    pub contact_email: Option<String>,

    pub ai_score: Option<u8>,
    pub ai_design_score: Option<u8>,
    pub ai_mobile_score: Option<u8>,
    pub ai_professionalism_score: Option<u8>,
    pub ai_cta_score: Option<u8>,
    pub ai_summary: Option<String>,
    pub ai_issues: Vec<String>,
}

impl Default for QualificationResult {
    fn default() -> Self {
        Self {
            qualifies: false,
            reasons: Vec::new(),
            disqualify_reason: None,
            has_website: false,
            is_mobile_friendly: true,
            load_time_seconds: None,
            is_slow: false,
            is_outdated: false,
            is_social_only: false,
            uses_free_email: false,
            has_broken_layout: false,
            is_chain_or_franchise: false,
            contact_email: None,
            ai_score: None,
            ai_design_score: None,
            ai_mobile_score: None,
            ai_professionalism_score: None,
            ai_cta_score: None,
            ai_summary: None,
            ai_issues: Vec::new(),
        }
    }
}

impl QualificationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark as qualifying with a terminal reason.
    pub fn qualify_with(mut self, reason: impl Into<String>) -> Self {
        self.qualifies = true;
        self.reasons.push(reason.into());
        self
    }

    /// Hard-disqualify. Clears qualification regardless of reasons found.
    pub fn disqualify(mut self, reason: impl Into<String>) -> Self {
        self.qualifies = false;
        self.disqualify_reason = Some(reason.into());
        self
    }

    /// Add a soft reason without deciding yet.
    pub fn push_reason(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    /// Decide from accumulated soft reasons.
    pub fn settle(mut self) -> Self {
        self.qualifies = self.disqualify_reason.is_none() && !self.reasons.is_empty();
        self
    }

    /// Passed every rule with a reachable site: a candidate for the vision pass.
    pub fn is_good_website(&self) -> bool {
        !self.qualifies && self.disqualify_reason.is_none() && self.has_website
    }

    /// Comma-joined reasons, as written to the tracker.
    pub fn reasons_text(&self) -> String {
        self.reasons.join(", ")
    }

    /// One-line description for logs.
    pub fn describe(&self) -> String {
        if self.qualifies {
            self.reasons_text()
        } else {
            self.disqualify_reason
                .clone()
                .unwrap_or_else(|| "Good website".to_string())
        }
    }

    /// Merge a vision verdict.
    ///
    /// Scores and summary are always copied so personalization can use them
    /// even when the AI confirms the site is fine. Qualification flips only
    /// when the verdict says the site needs a redesign.
    pub fn apply_ai_verdict(&mut self, verdict: &AiVerdict) {
        self.ai_score = Some(verdict.overall_score);
        self.ai_design_score = Some(verdict.design_score);
        self.ai_mobile_score = Some(verdict.mobile_score);
        self.ai_professionalism_score = Some(verdict.professionalism_score);
        self.ai_cta_score = Some(verdict.cta_score);
        self.ai_summary = Some(verdict.summary.clone());
        self.ai_issues = verdict.issues.clone();

        if !verdict.needs_redesign() || self.disqualify_reason.is_some() {
            return;
        }

        self.qualifies = true;
        let overall = verdict.overall_score;
        self.reasons.push(if overall <= AiVerdict::POOR_MAX_SCORE {
            format!("AI: Poor design ({}/10)", overall)
        } else if overall <= AiVerdict::REDESIGN_MAX_SCORE {
            format!("AI: Mediocre design ({}/10)", overall)
        } else {
            format!("AI: Needs a new website ({}/10)", overall)
        });

        // Reasons are stored comma-joined
        self.reasons.extend(
            verdict
                .issues
                .iter()
                .take(AiVerdict::MAX_REASON_ISSUES)
                .map(|issue| format!("AI: {}", issue.replace(',', ";"))),
        );
    }
}

/// Rubric scores returned by the vision scoring service (1-10 each).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiVerdict {
    pub design_score: u8,
    pub mobile_score: u8,
    pub professionalism_score: u8,
    pub cta_score: u8,
    pub overall_score: u8,
    pub needs_new_website: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl AiVerdict {
    /// Highest overall score reported as poor design.
    pub const POOR_MAX_SCORE: u8 = 4;

    /// Highest overall score that still counts as needing a redesign.
    pub const REDESIGN_MAX_SCORE: u8 = 5;

    /// AI issues copied into qualification reasons.
    pub const MAX_REASON_ISSUES: usize = 2;

    pub fn needs_redesign(&self) -> bool {
        self.needs_new_website || self.overall_score <= Self::REDESIGN_MAX_SCORE
    }
}
