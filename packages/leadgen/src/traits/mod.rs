//! Core trait abstractions for the lead generation library.
//!
//! These are the seams to external collaborators: page fetching, vision
//! scoring, text generation, the lead tracker and email delivery.

pub mod fetcher;
pub mod generator;
pub mod scorer;
pub mod tracker;
pub mod transport;
