// tests/harness/test_harness.rs
//
// High-level test harness: a scratch directory, a config, and one call that
// runs the repair end to end through the file API.

use std::fs;
use std::path::PathBuf;

use mbox_degoogle::cfg::config::{load_config, Config};
use mbox_degoogle::{Degoogler, SummaryCounters};
use tempfile::TempDir;

use crate::harness::fixtures::FixtureLoader;
use crate::harness::output_mbox::OutputMbox;

pub struct RunResult {
    pub summary: SummaryCounters,
    pub output: OutputMbox,
}

pub struct TestHarness {
    dir: TempDir,
    config: Config,
    loader: FixtureLoader,
}

impl TestHarness {
    /// Create a new test harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            dir: TempDir::new().expect("create scratch dir"),
            config,
            loader: FixtureLoader::new(),
        }
    }

    /// Write `yaml` to a config file and load it the way the binary does.
    pub fn with_config_yaml(yaml: &str) -> eyre::Result<Self> {
        let harness = Self::new();
        let path = harness.dir.path().join("mbox-degoogle.yml");
        fs::write(&path, yaml)?;
        let config = load_config(&path)?;
        Ok(Self { config, ..harness })
    }

    pub fn input_path(&self) -> PathBuf {
        self.dir.path().join("takeout.mbox")
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("repaired.mbox")
    }

    pub fn output_exists(&self) -> bool {
        self.output_path().exists()
    }

    /// Run the repair over `archive` and read the result back.
    pub fn run(&self, archive: &str) -> eyre::Result<RunResult> {
        self.run_bytes(archive.as_bytes())
    }

    pub fn run_bytes(&self, archive: &[u8]) -> eyre::Result<RunResult> {
        fs::write(self.input_path(), archive)?;
        let degoogler = Degoogler::new(&self.config)?;
        let summary = degoogler.process_file(&self.input_path(), &self.output_path())?;

        let raw = fs::read_to_string(self.output_path())?;
        let output = OutputMbox::parse(&raw, self.config.output_escaping)?;
        Ok(RunResult { summary, output })
    }

    /// Run the repair over a bundled fixture archive.
    pub fn run_fixture(&self, name: &str) -> eyre::Result<RunResult> {
        let fixture = self
            .loader
            .load_archive(name)
            .map_err(|e| eyre::eyre!("{}", e))?;
        self.run(&fixture.text)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
