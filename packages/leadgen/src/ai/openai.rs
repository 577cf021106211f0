//! OpenAI-backed vision scoring and pitch generation.
//!
//! # Example
//!
//! ```rust,ignore
//! use leadgen::ai::{OpenAIGenerator, OpenAIVisionScorer};
//!
//! let client = OpenAIClient::from_env()?;
//! let scorer = OpenAIVisionScorer::new(client.clone(), browserless).with_model("gpt-4o");
//! let generator = OpenAIGenerator::new(client);
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use browserless_client::{BrowserlessClient, ScreenshotOptions};
use openai_client::{ChatRequest, Message, OpenAIClient, OpenAIError};
use std::time::Duration;
use tracing::debug;

use crate::error::{GenerationError, ScoringError, ScoringResult};
use crate::qualify::{normalize_url, parse_verdict, vision_user_prompt, VISION_SYSTEM_PROMPT};
use crate::traits::generator::TextGenerator;
use crate::traits::scorer::{ScoreRequest, VisionScorer};
use crate::types::config::PersonalizerConfig;
use crate::types::qualification::AiVerdict;

const DEFAULT_MODEL: &str = "gpt-4o";

/// Screenshot navigation timeout.
const SCREENSHOT_TIMEOUT: Duration = Duration::from_secs(20);

/// Scores a site from a screenshot with a vision chat model.
#[derive(Clone)]
pub struct OpenAIVisionScorer {
    client: OpenAIClient,
    browser: BrowserlessClient,
    model: String,
}

impl OpenAIVisionScorer {
    pub fn new(client: OpenAIClient, browser: BrowserlessClient) -> Self {
        Self {
            client,
            browser,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set the vision model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl VisionScorer for OpenAIVisionScorer {
    async fn score(&self, request: &ScoreRequest) -> ScoringResult<AiVerdict> {
        let url = normalize_url(&request.url);

        let jpeg = self
            .browser
            .screenshot(&url, &ScreenshotOptions::new(SCREENSHOT_TIMEOUT))
            .await
            .map_err(|e| ScoringError::Screenshot(e.to_string()))?;
        debug!(url = %url, bytes = jpeg.len(), "Captured screenshot");

        let chat = ChatRequest::new(&self.model)
            .message(Message::system(VISION_SYSTEM_PROMPT))
            .message(Message::user_with_jpeg(
                vision_user_prompt(request),
                &STANDARD.encode(&jpeg),
            ))
            .temperature(0.1)
            .token_limit(500);

        let response = self
            .client
            .chat_completion(chat)
            .await
            .map_err(|e| match e {
                OpenAIError::Config(msg) => ScoringError::Unavailable(msg),
                other => ScoringError::Request(other.to_string()),
            })?;

        parse_verdict(&response.content)
    }
}

/// Single-prompt text generation.
#[derive(Clone)]
pub struct OpenAIGenerator {
    client: OpenAIClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIGenerator {
    pub fn new(client: OpenAIClient) -> Self {
        Self::from_config(client, &PersonalizerConfig::default())
    }

    /// Take model, temperature and token limit from `config`.
    pub fn from_config(client: OpenAIClient, config: &PersonalizerConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAIGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let chat = ChatRequest::new(&self.model)
            .message(Message::user(prompt))
            .temperature(self.temperature)
            .token_limit(self.max_tokens);

        let response = self
            .client
            .chat_completion(chat)
            .await
            .map_err(|e| match e {
                OpenAIError::Timeout(_) => GenerationError::Timeout,
                other => GenerationError::Request(other.to_string()),
            })?;

        if response.content.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(response.content)
    }
}
