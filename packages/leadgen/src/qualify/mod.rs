//! Qualification engine: rule pass, batch fan-out and the vision second pass.

pub mod batch;
pub mod engine;
pub mod facts;
pub mod patterns;
pub mod vision;

pub use batch::QualifiedBatch;
pub use engine::{classify_page, normalize_url, site_host, Qualifier};
pub use facts::PageFacts;
pub use patterns::{PatternSet, PatternTables};
pub use vision::{parse_verdict, vision_user_prompt, VISION_SYSTEM_PROMPT};
