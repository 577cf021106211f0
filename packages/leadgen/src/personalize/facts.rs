//! Verified facts about a lead, reconciled from rule and AI signals.

use serde::{Deserialize, Serialize};

use crate::types::lead::{QualifiedLead, TrackerRecord};

/// AI sub-scores at or below this force the matching rule fact on.
pub const AI_OVERRIDE_MAX_SCORE: u8 = 4;

/// Overall AI score at or below this counts as poor design.
pub const AI_POOR_DESIGN_MAX_SCORE: u8 = 5;

/// Reasons produced by the vision pass start with this.
const AI_REASON_PREFIX: &str = "ai:";

/// What personalization knows about one business.
///
/// Built from either a freshly qualified lead or a tracker row; the AI
/// sub-scores are only available for the former.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchContext {
    pub business_name: String,
    pub niche: String,
    pub city: String,
    pub website: String,

    /// Comma-joined qualification reasons
    pub reasons: String,

    pub ai_score: Option<u8>,
    pub ai_design_score: Option<u8>,
    pub ai_mobile_score: Option<u8>,
    pub ai_professionalism_score: Option<u8>,
    pub ai_cta_score: Option<u8>,
    pub ai_summary: String,
    pub ai_issues: Vec<String>,
}

impl From<&QualifiedLead> for PitchContext {
    fn from(lead: &QualifiedLead) -> Self {
        Self {
            business_name: lead.name.clone(),
            niche: lead.niche.clone(),
            city: lead.city.clone(),
            website: lead.website.clone().unwrap_or_default(),
            reasons: lead.qualification_reasons.clone(),
            ai_score: lead.ai_score,
            ai_design_score: lead.ai_design_score,
            ai_mobile_score: lead.ai_mobile_score,
            ai_professionalism_score: lead.ai_professionalism_score,
            ai_cta_score: lead.ai_cta_score,
            ai_summary: lead.ai_summary.clone(),
            ai_issues: lead.ai_issues.clone(),
        }
    }
}

impl From<&TrackerRecord> for PitchContext {
    fn from(record: &TrackerRecord) -> Self {
        Self {
            business_name: record.business_name.clone().unwrap_or_default(),
            niche: record.niche.clone().unwrap_or_default(),
            city: record.city.clone().unwrap_or_default(),
            website: record.website.clone().unwrap_or_default(),
            reasons: record.qualification_reasons.clone().unwrap_or_default(),
            ai_score: record.ai_score(),
            ai_summary: record.ai_summary.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// The only claims a pitch may make.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSheet {
    pub has_website: bool,
    pub no_website: bool,
    pub social_media_only: bool,
    pub outdated_design: bool,
    pub not_mobile_friendly: bool,
    pub slow_loading: bool,
    pub broken_layout: bool,
    pub uses_free_email: bool,
    pub website_unreachable: bool,
    pub ai_poor_design: bool,

    pub ai_score: Option<u8>,
    pub ai_design_score: Option<u8>,
    pub ai_mobile_score: Option<u8>,
    pub ai_professionalism_score: Option<u8>,
    pub ai_cta_score: Option<u8>,
    pub ai_summary: String,
    pub ai_issues: Vec<String>,

    /// Reasons as written, shown when no fact is set
    pub raw_reasons: String,
}

impl FactSheet {
    /// Derive facts from qualification reasons, the website and AI scores.
    ///
    /// Rule facts come only from rule reasons; `AI:` reasons feed
    /// `ai_poor_design` alone. Low AI mobile or design sub-scores then force
    /// `not_mobile_friendly` or `outdated_design` on.
    pub fn derive(context: &PitchContext) -> Self {
        let lowered = context.reasons.to_lowercase();
        let (ai_reasons, rule_reasons): (Vec<&str>, Vec<&str>) = lowered
            .split(", ")
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .partition(|r| r.starts_with(AI_REASON_PREFIX));

        let rules = |needles: &[&str]| {
            rule_reasons
                .iter()
                .any(|reason| needles.iter().any(|n| reason.contains(n)))
        };

        let has_website = !context.website.trim().is_empty();

        let ai_reason_poor = ai_reasons
            .iter()
            .any(|r| r.contains("poor design") || r.contains("mediocre"));

        let mut facts = Self {
            has_website,
            no_website: rules(&["no website"]) && !has_website,
            social_media_only: rules(&["social media only", "social only"]),
            outdated_design: rules(&["outdated"]),
            not_mobile_friendly: rules(&["not mobile", "mobile-friendly"]),
            slow_loading: rules(&["slow"]),
            broken_layout: rules(&["broken", "poor design"]),
            uses_free_email: rules(&["free email", "gmail", "yahoo"]),
            website_unreachable: rules(&["unreachable", "server error", "empty website"]),
            ai_poor_design: context
                .ai_score
                .is_some_and(|s| s <= AI_POOR_DESIGN_MAX_SCORE)
                || ai_reason_poor,
            ai_score: context.ai_score,
            ai_design_score: context.ai_design_score,
            ai_mobile_score: context.ai_mobile_score,
            ai_professionalism_score: context.ai_professionalism_score,
            ai_cta_score: context.ai_cta_score,
            ai_summary: context.ai_summary.trim().to_string(),
            ai_issues: context.ai_issues.clone(),
            raw_reasons: context.reasons.clone(),
        };

        if context
            .ai_mobile_score
            .is_some_and(|s| s <= AI_OVERRIDE_MAX_SCORE)
        {
            facts.not_mobile_friendly = true;
        }
        if context
            .ai_design_score
            .is_some_and(|s| s <= AI_OVERRIDE_MAX_SCORE)
        {
            facts.outdated_design = true;
        }

        facts
    }

    /// Whether any weakness is verified.
    pub fn has_weakness(&self) -> bool {
        self.no_website
            || self.social_media_only
            || self.outdated_design
            || self.not_mobile_friendly
            || self.slow_loading
            || self.broken_layout
            || self.uses_free_email
            || self.website_unreachable
            || self.ai_poor_design
    }

    /// Human-readable block embedded in the generation prompt.
    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "- has_website: {}",
            if self.has_website { "TRUE" } else { "FALSE" }
        )];

        let flags: [(bool, &str); 8] = [
            (
                self.no_website,
                "- no_website: TRUE (business has no website at all)",
            ),
            (
                self.social_media_only,
                "- social_media_only: TRUE (website URL points to a social media page such as Facebook or Instagram, not a real business website)",
            ),
            (
                self.outdated_design,
                "- outdated_design: TRUE (website uses outdated HTML patterns or has an old copyright year)",
            ),
            (
                self.not_mobile_friendly,
                "- not_mobile_friendly: TRUE (website has no mobile viewport tag and won't display well on phones)",
            ),
            (
                self.slow_loading,
                "- slow_loading: TRUE (website took over 4 seconds to load)",
            ),
            (
                self.broken_layout,
                "- broken_layout: TRUE (website has broken images, missing stylesheets or layout issues)",
            ),
            (
                self.uses_free_email,
                "- uses_free_email: TRUE (business uses Gmail/Yahoo/Hotmail instead of a branded email)",
            ),
            (
                self.website_unreachable,
                "- website_unreachable: TRUE (website could not be loaded at all)",
            ),
        ];
        lines.extend(flags.iter().filter(|(set, _)| *set).map(|(_, line)| line.to_string()));

        if let Some(overall) = self.ai_score {
            lines.push(String::new());
            lines.push("AI VISUAL ANALYSIS RESULTS (verified by screenshot inspection):".into());
            lines.push(format!("- overall_score: {}/10", overall));

            let sub_scores = [
                ("design_score", self.ai_design_score),
                ("mobile_score", self.ai_mobile_score),
                ("professionalism_score", self.ai_professionalism_score),
                ("cta_score", self.ai_cta_score),
            ];
            for (label, score) in sub_scores {
                if let Some(score) = score {
                    lines.push(format!("- {}: {}/10", label, score));
                }
            }

            if !self.ai_summary.is_empty() {
                lines.push(format!("- ai_verdict: {}", self.ai_summary));
            }
            if !self.ai_issues.is_empty() {
                lines.push(format!("- specific_issues_found: {}", self.ai_issues.join(", ")));
            }
            lines.push(
                "(You may reference these AI findings; they are verified from a real screenshot)"
                    .into(),
            );
        } else if self.ai_poor_design {
            lines.push(
                "- ai_poor_design: TRUE (AI visual analysis rated the design as poor or mediocre)"
                    .into(),
            );
        }

        if self.ai_score.is_none() && !self.has_weakness() {
            lines.push(format!("- raw_reasons: {}", self.raw_reasons));
        }

        lines.join("\n")
    }
}
