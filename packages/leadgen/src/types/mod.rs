pub mod business;
pub mod config;
pub mod lead;
pub mod qualification;
