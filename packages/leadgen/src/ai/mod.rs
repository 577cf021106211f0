//! Model-backed implementations of the scoring and generation traits.
//!
//! Requires the `openai` feature.

mod openai;

pub use openai::{OpenAIGenerator, OpenAIVisionScorer};
