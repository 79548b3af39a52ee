// tests/harness/mod.rs
//
// Integration testing harness for mbox-degoogle.
// Builds Takeout-style archives, runs the repair on disk, and parses the result.

pub mod fixtures;
pub mod takeout_archive;
pub mod test_harness;

pub use fixtures::{ArchiveFixture, FixtureError, FixtureLoader};
pub use output_mbox::{OutputMbox, OutputMessage};
pub use takeout_archive::{TakeoutArchive, TakeoutMessage};
pub use test_harness::{RunResult, TestHarness};
