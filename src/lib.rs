// src/lib.rs
//
// Library entry point for mbox-degoogle.
// Re-exports the types the binary and integration tests drive.

pub mod cfg;
pub mod cli;
pub mod date;
pub mod degoogle;
pub mod mbox;
pub mod message;
pub mod normalizer;
pub mod recovery;
pub mod splitter;
pub mod summary;
pub mod utils;

pub use cfg::config::{Config, MalformedPolicy};
pub use degoogle::Degoogler;
pub use mbox::FromEscaping;
pub use summary::SummaryCounters;
