//! Contradiction check for generated pitches.
//!
//! A pitch is accepted or rejected whole. Each phrase bank is only active
//! when the fact it would contradict is false.

use tracing::warn;

use super::facts::FactSheet;

/// Phrasings that claim the business has no web presence.
pub const NO_WEBSITE_PHRASES: &[&str] = &[
    "don't have a website",
    "do not have a website",
    "doesn't have a website",
    "does not have a website",
    "no website",
    "without a website",
    "lack a website",
    "lacking a website",
    "haven't got a website",
    "have no website",
    "no online presence",
    "no web presence",
    "invisible online",
    "invisible to",
    "can't find you online",
    "cannot find you online",
    "can't be found online",
    "cannot be found online",
    "doesn't exist online",
    "does not exist online",
    "no digital presence",
    "missing a website",
];

pub const OUTDATED_PHRASES: &[&str] = &[
    "looks outdated",
    "looks dated",
    "looks old",
    "design is outdated",
    "design is dated",
    "looks like it was built in",
    "looks like it hasn't been updated",
];

pub const SLOW_PHRASES: &[&str] = &["takes a long time to load", "slow to load", "slow loading"];

pub const NOT_MOBILE_PHRASES: &[&str] = &[
    "not mobile friendly",
    "not mobile-friendly",
    "doesn't work on mobile",
    "does not work on mobile",
    "not optimized for mobile",
    "not responsive",
];

/// Why a pitch was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contradiction {
    /// Fact the pitch contradicts
    pub fact: &'static str,

    /// Phrase that matched
    pub phrase: &'static str,
}

/// Find the first unverified claim in `pitch`, if any.
pub fn find_contradiction(pitch: &str, facts: &FactSheet) -> Option<Contradiction> {
    let lowered = pitch.to_lowercase();

    let checks: [(bool, &'static str, &[&'static str]); 4] = [
        (
            facts.has_website && !facts.no_website && !facts.social_media_only,
            "has_website",
            NO_WEBSITE_PHRASES,
        ),
        (
            !facts.outdated_design && !facts.ai_poor_design,
            "outdated_design",
            OUTDATED_PHRASES,
        ),
        (!facts.slow_loading, "slow_loading", SLOW_PHRASES),
        (
            !facts.not_mobile_friendly,
            "not_mobile_friendly",
            NOT_MOBILE_PHRASES,
        ),
    ];

    checks
        .into_iter()
        .filter(|(active, _, _)| *active)
        .find_map(|(_, fact, phrases)| {
            phrases
                .iter()
                .copied()
                .find(|phrase| lowered.contains(*phrase))
                .map(|phrase| Contradiction { fact, phrase })
        })
}

/// Return the pitch if it makes no unverified claim.
pub fn validate_pitch<'a>(pitch: &'a str, facts: &FactSheet) -> Option<&'a str> {
    match find_contradiction(pitch, facts) {
        Some(contradiction) => {
            warn!(
                fact = contradiction.fact,
                phrase = contradiction.phrase,
                "Generated pitch contradicts verified facts, falling back to rules"
            );
            None
        }
        None => Some(pitch),
    }
}
