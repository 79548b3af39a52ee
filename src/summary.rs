// src/summary.rs

use log::info;

/// Totals for one run. Only the orchestrator mutates these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCounters {
    pub messages_seen: usize,
    pub dates_fixed: usize,
    pub metadata_headers_removed: usize,
    pub envelope_lines_corrected: usize,
    pub threading_headers_restored: usize,
    pub epoch_fallbacks: usize,
    pub malformed_skipped: usize,
}

impl SummaryCounters {
    pub fn report(&self) {
        info!(
            "Processed {} messages, fixed {} dates",
            self.messages_seen, self.dates_fixed
        );
        info!("Removed {} X-Google headers", self.metadata_headers_removed);
        info!("Fixed {} Google From lines", self.envelope_lines_corrected);
        info!(
            "Preserved {} threading headers",
            self.threading_headers_restored
        );
        if self.epoch_fallbacks > 0 {
            info!(
                "{} envelope lines fell back to the epoch date",
                self.epoch_fallbacks
            );
        }
        if self.malformed_skipped > 0 {
            info!("Skipped {} malformed messages", self.malformed_skipped);
        }
    }
}
