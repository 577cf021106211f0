//! Lead tracker implementations.
//!
//! Available backends:
//! - `MemoryTracker` - In-memory sheets, optionally loaded from and saved to JSON

pub mod memory;

pub use memory::{MemoryTracker, SheetData};
