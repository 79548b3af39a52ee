// src/splitter.rs

use regex::{Regex, Split};
use std::sync::LazyLock;

/// A Google Takeout envelope marker: `From 1234567890` or `From -1234`, alone
/// on its line.
static RE_ENVELOPE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^From -?[0-9]+\r?$\n?").unwrap());

/// One message's unparsed text, headers and body, without its marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessageBlock<'a> {
    text: &'a str,
}

impl<'a> RawMessageBlock<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }
}

/// Single-pass iterator over the message blocks of an archive.
pub struct SplitBlocks<'a> {
    pieces: Split<'static, 'a>,
    marker_count: usize,
}

impl<'a> SplitBlocks<'a> {
    /// Number of marker lines in the archive, regardless of how many blocks
    /// turn out to be empty.
    pub fn marker_count(&self) -> usize {
        self.marker_count
    }
}

impl<'a> Iterator for SplitBlocks<'a> {
    type Item = RawMessageBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pieces
            .by_ref()
            .find(|piece| !piece.trim().is_empty())
            .map(RawMessageBlock::new)
    }
}

/// Splits an archive on its envelope marker lines. Whitespace-only blocks are
/// dropped.
pub fn split(blob: &str) -> SplitBlocks<'_> {
    let marker: &'static Regex = &RE_ENVELOPE_MARKER;
    SplitBlocks {
        pieces: marker.split(blob),
        marker_count: marker.find_iter(blob).count(),
    }
}
