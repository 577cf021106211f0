//! Generate-then-verify pitch writing.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::facts::{FactSheet, PitchContext};
use super::fallback::fallback_pitch;
use super::guard::validate_pitch;
use super::prompts::format_personalization_prompt;
use crate::error::GenerationError;
use crate::traits::generator::TextGenerator;
use crate::types::config::PersonalizerConfig;

/// Where a pitch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchSource {
    Generated,
    Fallback,
}

/// A pitch together with the facts it was checked against.
#[derive(Debug, Clone)]
pub struct Pitch {
    pub text: String,
    pub source: PitchSource,
    pub facts: FactSheet,
}

/// Writes the personalized paragraph of an outreach email.
///
/// Without a generator every pitch is the rule-based fallback.
#[derive(Clone, Default)]
pub struct Personalizer {
    generator: Option<Arc<dyn TextGenerator>>,
    config: PersonalizerConfig,
}

impl Personalizer {
    pub fn new(config: PersonalizerConfig) -> Self {
        Self {
            generator: None,
            config,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn config(&self) -> &PersonalizerConfig {
        &self.config
    }

    /// Pitch text for a lead. Never fails.
    pub async fn personalize(&self, context: &PitchContext) -> String {
        self.pitch(context).await.text
    }

    /// Pitch with its provenance.
    pub async fn pitch(&self, context: &PitchContext) -> Pitch {
        let facts = FactSheet::derive(context);

        let Some(generator) = self.generator.as_ref() else {
            return self.fallback(context, facts);
        };

        let prompt = format_personalization_prompt(&self.config.agency_name, context, &facts);

        let generated = match tokio::time::timeout(self.config.timeout, generator.generate(&prompt))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout),
        };

        let text = match generated.map(|raw| clean_generated(&raw)) {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                warn!(business = %context.business_name, "Generated pitch was empty, using fallback");
                return self.fallback(context, facts);
            }
            Err(e) => {
                warn!(business = %context.business_name, error = %e, "Personalization failed, using fallback");
                return self.fallback(context, facts);
            }
        };

        match validate_pitch(&text, &facts) {
            Some(valid) => {
                debug!(business = %context.business_name, pitch = %preview(valid), "Generated pitch");
                Pitch {
                    text: valid.to_string(),
                    source: PitchSource::Generated,
                    facts,
                }
            }
            None => {
                info!(business = %context.business_name, "Generated pitch failed validation, using fallback");
                self.fallback(context, facts)
            }
        }
    }

    fn fallback(&self, context: &PitchContext, facts: FactSheet) -> Pitch {
        Pitch {
            text: fallback_pitch(&facts, &context.niche),
            source: PitchSource::Fallback,
            facts,
        }
    }
}

/// Trim whitespace and wrapping quotes.
fn clean_generated(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(80) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personalize::fallback::FallbackPitch;
    use crate::testing::MockGenerator;
    use std::time::Duration;

    fn context() -> PitchContext {
        PitchContext {
            business_name: "Sunrise Dental".into(),
            niche: "dentist".into(),
            city: "Leeds".into(),
            website: "sunrisedental.co.uk".into(),
            reasons: "Uses free email (gmail.com)".into(),
            ..Default::default()
        }
    }

    fn expected_fallback() -> String {
        FallbackPitch::FreeEmailWithWebsite.render("dentist")
    }

    #[tokio::test]
    async fn test_without_generator_uses_fallback() {
        let pitch = Personalizer::default().pitch(&context()).await;

        assert_eq!(pitch.source, PitchSource::Fallback);
        assert_eq!(pitch.text, expected_fallback());
    }

    #[tokio::test]
    async fn test_clean_generation_is_used() {
        let generator = Arc::new(MockGenerator::new().with_response(
            "\"A branded address like hello@sunrisedental.co.uk makes every enquiry feel established.\"",
        ));
        let personalizer = Personalizer::default().with_generator(generator.clone());

        let pitch = personalizer.pitch(&context()).await;

        assert_eq!(pitch.source, PitchSource::Generated);
        assert_eq!(
            pitch.text,
            "A branded address like hello@sunrisedental.co.uk makes every enquiry feel established."
        );

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- uses_free_email: TRUE"));
        assert!(prompts[0].contains("- Location: Leeds"));
    }

    #[tokio::test]
    async fn test_false_claim_is_replaced() {
        let generator = MockGenerator::new()
            .with_response("Without a website, customers can't find you online. Let's fix that.");
        let personalizer = Personalizer::default().with_generator(Arc::new(generator));

        let text = personalizer.personalize(&context()).await;

        assert_eq!(text, expected_fallback());
    }

    #[tokio::test]
    async fn test_generation_failure_falls_back() {
        let generator = MockGenerator::new().with_failure("401 unauthorized");
        let personalizer = Personalizer::default().with_generator(Arc::new(generator));

        assert_eq!(personalizer.personalize(&context()).await, expected_fallback());
    }

    #[tokio::test]
    async fn test_blank_generation_falls_back() {
        let generator = MockGenerator::new().with_response("  \"\"  ");
        let personalizer = Personalizer::default().with_generator(Arc::new(generator));

        let pitch = personalizer.pitch(&context()).await;
        assert_eq!(pitch.source, PitchSource::Fallback);
    }

    #[tokio::test]
    async fn test_generation_timeout_falls_back() {
        let generator = MockGenerator::new()
            .with_response("A fine pitch.")
            .with_delay(Duration::from_secs(5));
        let config = PersonalizerConfig::new().with_timeout(Duration::from_millis(20));
        let personalizer = Personalizer::new(config).with_generator(Arc::new(generator));

        let pitch = personalizer.pitch(&context()).await;
        assert_eq!(pitch.source, PitchSource::Fallback);
    }
}
