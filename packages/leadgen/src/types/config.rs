//! Configuration types for qualification, personalization and outreach.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do with a 4xx response (other than 404/410) whose body is
/// empty or implausibly short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotWallPolicy {
    /// Assume a captcha or bot wall in front of a working site and skip it.
    #[default]
    Disqualify,

    /// Treat the response as a broken site and qualify it.
    TreatAsBroken,
}

/// Configuration for the qualification engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifierConfig {
    /// Per-strategy page fetch timeout.
    ///
    /// Default: 15s.
    pub timeout: Duration,

    /// Load time above which a site counts as slow, in seconds.
    ///
    /// Default: 4.0.
    pub slow_threshold: f64,

    /// Copyright years before this one count as outdated.
    ///
    /// Default: 2020.
    pub outdated_before: i32,

    /// Businesses qualified in parallel. Default: 5.
    pub max_concurrent: usize,

    /// Vision scoring calls in flight. Default: 3.
    pub ai_max_concurrent: usize,

    /// Timeout for one vision scoring call (screenshot included).
    ///
    /// Default: 60s.
    pub ai_timeout: Duration,

    pub bot_wall_policy: BotWallPolicy,

    /// Fetched HTML shorter than this is not trusted and the next fetch
    /// strategy is tried. Default: 500.
    pub plausible_min_chars: usize,
}

impl Default for QualifierConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            slow_threshold: 4.0,
            outdated_before: 2020,
            max_concurrent: 5,
            ai_max_concurrent: 3,
            ai_timeout: Duration::from_secs(60),
            bot_wall_policy: BotWallPolicy::Disqualify,
            plausible_min_chars: 500,
        }
    }
}

impl QualifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_slow_threshold(mut self, seconds: f64) -> Self {
        self.slow_threshold = seconds;
        self
    }

    pub fn with_outdated_before(mut self, year: i32) -> Self {
        self.outdated_before = year;
        self
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    pub fn with_ai_max_concurrent(mut self, max: usize) -> Self {
        self.ai_max_concurrent = max.max(1);
        self
    }

    pub fn with_ai_timeout(mut self, timeout: Duration) -> Self {
        self.ai_timeout = timeout;
        self
    }

    pub fn with_bot_wall_policy(mut self, policy: BotWallPolicy) -> Self {
        self.bot_wall_policy = policy;
        self
    }
}

/// Configuration for pitch generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizerConfig {
    /// Agency named in the generation prompt
    pub agency_name: String,

    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,

    /// Generation timeout. Default: 30s.
    pub timeout: Duration,
}

impl Default for PersonalizerConfig {
    fn default() -> Self {
        Self {
            agency_name: "Burra.io".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: 200,
            timeout: Duration::from_secs(30),
        }
    }
}

impl PersonalizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agency_name(mut self, name: impl Into<String>) -> Self {
        self.agency_name = name.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for outreach sending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachConfig {
    /// Emails allowed per day. Default: 80.
    pub daily_limit: u32,

    /// Minimum pause between two sends. Default: 30s.
    pub delay_min: Duration,

    /// Maximum pause between two sends. Default: 60s.
    pub delay_max: Duration,

    /// Value of the tracker's "Added By" column
    pub added_by: String,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            daily_limit: 80,
            delay_min: Duration::from_secs(30),
            delay_max: Duration::from_secs(60),
            added_by: "Leadgen".to_string(),
        }
    }
}

impl OutreachConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }

    /// Set the pause range between sends. Bounds are swapped if reversed.
    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.delay_min = min.min(max);
        self.delay_max = max.max(min);
        self
    }

    pub fn with_added_by(mut self, added_by: impl Into<String>) -> Self {
        self.added_by = added_by.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifier_defaults() {
        let config = QualifierConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.slow_threshold, 4.0);
        assert_eq!(config.outdated_before, 2020);
        assert_eq!(config.max_concurrent, 5);
        assert_eq!(config.ai_max_concurrent, 3);
        assert_eq!(config.bot_wall_policy, BotWallPolicy::Disqualify);
    }

    #[test]
    fn test_concurrency_never_zero() {
        let config = QualifierConfig::new()
            .with_max_concurrent(0)
            .with_ai_max_concurrent(0);
        assert_eq!(config.max_concurrent, 1);
        assert_eq!(config.ai_max_concurrent, 1);
    }

    #[test]
    fn test_reversed_delay_range_is_normalized() {
        let config = OutreachConfig::new().with_delay(Duration::from_secs(10), Duration::from_secs(2));
        assert_eq!(config.delay_min, Duration::from_secs(2));
        assert_eq!(config.delay_max, Duration::from_secs(10));
    }

    #[test]
    fn test_bot_wall_policy_serde() {
        let json = serde_json::to_string(&BotWallPolicy::TreatAsBroken).unwrap();
        assert_eq!(json, "\"treat_as_broken\"");
    }
}
