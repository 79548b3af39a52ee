// src/cfg/metadata_filter.rs

use eyre::{eyre, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml::Value;

/// Header prefix the webmail export stamps on its own metadata.
pub const GOOGLE_METADATA_PREFIX: &str = "X-Google-";

/// Decides which header names are provider metadata.
///
/// Prefixes are matched case-sensitively against the name as written; globs
/// go through `globset` with its default (case-sensitive) options.
#[derive(Debug, Clone)]
pub struct MetadataFilter {
    prefixes: Vec<String>,
    patterns: Vec<String>,
    globs: GlobSet,
}

impl Default for MetadataFilter {
    fn default() -> Self {
        MetadataFilter {
            prefixes: vec![GOOGLE_METADATA_PREFIX.to_string()],
            patterns: Vec::new(),
            globs: GlobSet::empty(),
        }
    }
}

impl MetadataFilter {
    pub fn new(prefixes: &[String], patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat)
                .map_err(|e| eyre!("Invalid metadata header pattern '{}': {}", pat, e))?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|e| eyre!("Failed to compile metadata header patterns: {}", e))?;

        Ok(MetadataFilter {
            prefixes: prefixes.iter().filter(|p| !p.is_empty()).cloned().collect(),
            patterns: patterns.to_vec(),
            globs,
        })
    }

    /// Returns true if the header `name` is provider metadata.
    pub fn matches(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str())) || self.globs.is_match(name)
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Accepts either a single string or a sequence of strings.
pub fn deserialize_string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer).map_err(de::Error::custom)?;
    match v {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|val| {
                if let Value::String(s) = val {
                    Ok(s)
                } else {
                    Err(de::Error::custom("Invalid entry in header name list"))
                }
            })
            .collect(),
        _ => Err(de::Error::custom("Expected a string or a list of strings")),
    }
}
