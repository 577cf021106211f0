//! Hallucination-guarded personalization.
//!
//! Facts are derived first, the generator may only use them, and any
//! generated text that claims an unverified weakness is replaced by a
//! deterministic fallback.

pub mod facts;
pub mod fallback;
pub mod guard;
pub mod personalizer;
pub mod prompts;

pub use facts::{FactSheet, PitchContext};
pub use fallback::{fallback_pitch, FallbackPitch};
pub use guard::{find_contradiction, validate_pitch, Contradiction};
pub use personalizer::{Personalizer, Pitch, PitchSource};
pub use prompts::{format_personalization_prompt, PERSONALIZATION_PROMPT};
