// src/normalizer.rs

use log::debug;

use crate::cfg::metadata_filter::MetadataFilter;
use crate::date::{header_date, DateFixer};
use crate::message::ParsedMessage;

/// Headers mail clients rebuild conversations from.
pub const THREADING_HEADERS: [&str; 3] = ["References", "In-Reply-To", "Message-ID"];

/// Threading header values captured before the metadata purge. An absent
/// header is captured as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadingHeaderSet {
    values: Vec<(&'static str, String)>,
}

impl ThreadingHeaderSet {
    pub fn capture(msg: &ParsedMessage) -> Self {
        let values = THREADING_HEADERS
            .iter()
            .map(|&name| (name, msg.get(name).unwrap_or_default().to_string()))
            .collect();
        ThreadingHeaderSet { values }
    }

    #[cfg(test)]
    fn get(&self, name: &str) -> &str {
        self.values
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    /// Entries with a non-empty captured value.
    pub fn present(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(n, v)| (*n, v.as_str()))
    }
}

/// What `normalize` did to one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOutcome {
    pub date_fixed: bool,
    pub metadata_removed: usize,
    pub threading_restored: usize,
}

/// Rewrites one message's headers: Date fix, threading snapshot, metadata
/// purge, threading restore, in that order.
#[derive(Default)]
pub struct HeaderNormalizer {
    dates: DateFixer,
    metadata: MetadataFilter,
}

impl HeaderNormalizer {
    pub fn new(dates: DateFixer, metadata: MetadataFilter) -> Self {
        Self { dates, metadata }
    }

    pub fn dates(&self) -> &DateFixer {
        &self.dates
    }

    pub fn normalize(&self, msg: &mut ParsedMessage) -> NormalizeOutcome {
        let date_fixed = self.fix_date(msg);
        let snapshot = ThreadingHeaderSet::capture(msg);
        let metadata_removed = self.purge_metadata(msg);
        let threading_restored = restore_threading(msg, &snapshot);

        NormalizeOutcome {
            date_fixed,
            metadata_removed,
            threading_restored,
        }
    }

    /// Replaces a recoverable Date header with its canonical GMT form.
    /// Unrecoverable dates are left as they are.
    fn fix_date(&self, msg: &mut ParsedMessage) -> bool {
        let Some(original) = msg.get_unfolded("Date") else {
            return false;
        };
        match self.dates.fix(&original) {
            Some(ts) => {
                let fixed = header_date(&ts);
                debug!("Date '{}' → '{}'", original, fixed);
                msg.replace("Date", &fixed)
            }
            None => {
                debug!("Date '{}' is unrecoverable; leaving it untouched", original);
                false
            }
        }
    }

    fn purge_metadata(&self, msg: &mut ParsedMessage) -> usize {
        let removed = msg.remove_where(|name| self.metadata.matches(name));
        for header in &removed {
            debug!("Removed metadata header {}", header.name);
        }
        removed.len()
    }
}

/// Writes every captured threading value back, replacing in place or
/// appending when the purge took the header.
fn restore_threading(msg: &mut ParsedMessage, snapshot: &ThreadingHeaderSet) -> usize {
    let mut restored = 0;
    for (name, value) in snapshot.present() {
        msg.set(name, value);
        restored += 1;
    }
    restored
}
