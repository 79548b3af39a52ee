// src/cfg/config.rs

use eyre::{eyre, Result};
use log::{debug, error};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cfg::metadata_filter::{deserialize_string_or_seq, MetadataFilter, GOOGLE_METADATA_PREFIX};
use crate::mbox::FromEscaping;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MBOX_DEGOOGLE_CONFIG";

const CONFIG_DIR: &str = "mbox-degoogle";
const CONFIG_FILE: &str = "mbox-degoogle.yml";

/// What to do with a block that does not parse as a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log it, count it, leave it out of the output.
    #[default]
    Skip,
    /// Fail the whole run.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "metadata-prefixes", deserialize_with = "deserialize_string_or_seq")]
    pub metadata_prefixes: Vec<String>,

    /// header-name globs, e.g. `X-Gm-*`
    #[serde(alias = "metadata-patterns", deserialize_with = "deserialize_string_or_seq")]
    pub metadata_patterns: Vec<String>,

    #[serde(alias = "on-malformed")]
    pub on_malformed: MalformedPolicy,

    #[serde(alias = "output-escaping")]
    pub output_escaping: FromEscaping,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            metadata_prefixes: vec![GOOGLE_METADATA_PREFIX.to_string()],
            metadata_patterns: Vec::new(),
            on_malformed: MalformedPolicy::default(),
            output_escaping: FromEscaping::default(),
        }
    }
}

impl Config {
    pub fn metadata_filter(&self) -> Result<MetadataFilter> {
        MetadataFilter::new(&self.metadata_prefixes, &self.metadata_patterns)
    }
}

pub fn load_config(config_path: &Path) -> Result<Config> {
    debug!("Loading configuration from {:?}", config_path);

    let content = fs::read_to_string(config_path).map_err(|e| {
        error!("Failed to read config file {}: {}", config_path.display(), e);
        eyre!("Failed to read config file {}: {}", config_path.display(), e)
    })?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    let cfg: Config = serde_yaml::from_str(&content).map_err(|e| {
        error!("Failed to parse YAML: {}", e);
        eyre!("Failed to parse YAML in {}: {}", config_path.display(), e)
    })?;

    debug!("Successfully loaded configuration");
    Ok(cfg)
}

/// `$MBOX_DEGOOGLE_CONFIG` if set, otherwise the per-user config file when it
/// exists.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
        .filter(|path| path.is_file())
}

/// Load the resolved config file, or fall back to defaults when there is none.
pub fn load_or_default() -> Result<Config> {
    match resolve_config_path() {
        Some(path) => load_config(&path),
        None => {
            debug!("No configuration file found; using defaults");
            Ok(Config::default())
        }
    }
}
