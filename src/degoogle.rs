// src/degoogle.rs

use eyre::{eyre, Result};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::cfg::config::{Config, MalformedPolicy};
use crate::date::{DateFixer, EPOCH_ENVELOPE_DATE};
use crate::mbox::{FromEscaping, MboxReader, MboxWriter};
use crate::message::ParsedMessage;
use crate::normalizer::HeaderNormalizer;
use crate::splitter;
use crate::summary::SummaryCounters;
use crate::utils::normalize_newlines;

/// Drives the two passes over a Takeout archive: envelope synthesis into an
/// intermediate mbox, then header normalization into the output.
#[derive(Default)]
pub struct Degoogler {
    normalizer: HeaderNormalizer,
    on_malformed: MalformedPolicy,
    output_escaping: FromEscaping,
}

impl Degoogler {
    pub fn new(config: &Config) -> Result<Self> {
        let metadata = config.metadata_filter()?;
        debug!(
            "Initializing Degoogler with metadata prefixes {:?}, patterns {:?}, on-malformed {:?}",
            metadata.prefixes(),
            metadata.patterns(),
            config.on_malformed,
        );
        Ok(Degoogler {
            normalizer: HeaderNormalizer::new(DateFixer::default(), metadata),
            on_malformed: config.on_malformed,
            output_escaping: config.output_escaping,
        })
    }

    /// Repair `input` into `output`. The output path is only replaced once the
    /// whole run has succeeded.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<SummaryCounters> {
        info!("Reading {}", input.display());
        let raw = fs::read(input)
            .map_err(|e| eyre!("Failed to read input file {}: {}", input.display(), e))?;
        let blob = normalize_newlines(&String::from_utf8_lossy(&raw));

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)
            .map_err(|e| eyre!("Failed to create output file in {}: {}", dir.display(), e))?;

        let summary = {
            let mut writer = BufWriter::new(staged.as_file_mut());
            let summary = self.process(&blob, &mut writer)?;
            writer
                .flush()
                .map_err(|e| eyre!("Failed to write output file {}: {}", output.display(), e))?;
            summary
        };

        staged
            .persist(output)
            .map_err(|e| eyre!("Failed to write output file {}: {}", output.display(), e.error))?;
        info!("✅ Wrote {}", output.display());
        Ok(summary)
    }

    /// Repair an archive held in memory, writing the mbox result to `output`.
    pub fn process<W: Write>(&self, blob: &str, output: &mut W) -> Result<SummaryCounters> {
        let mut counters = SummaryCounters::default();

        let mut intermediate = tempfile::tempfile()
            .map_err(|e| eyre!("Failed to create intermediate mbox: {}", e))?;
        self.synthesize_envelopes(blob, &mut intermediate, &mut counters)?;

        intermediate
            .seek(SeekFrom::Start(0))
            .map_err(|e| eyre!("Failed to rewind intermediate mbox: {}", e))?;
        self.normalize_messages(&intermediate, output, &mut counters)?;

        Ok(counters)
    }

    /// Pass 1: replace every Takeout marker with a real envelope line.
    fn synthesize_envelopes(
        &self,
        blob: &str,
        intermediate: &mut File,
        counters: &mut SummaryCounters,
    ) -> Result<()> {
        info!("→ Pass 1: synthesizing envelope lines");
        let blocks = splitter::split(blob);
        counters.envelope_lines_corrected = blocks.marker_count();

        let mut writer = MboxWriter::new(BufWriter::new(intermediate), FromEscaping::Mboxrd);
        for (index, block) in blocks.enumerate() {
            let content = block.trimmed();
            let msg = match ParsedMessage::parse(content) {
                Ok(msg) => msg,
                Err(e) => {
                    self.handle_malformed(index, e, counters)?;
                    continue;
                }
            };

            let sender = msg.sender_address();
            let date = self.envelope_date(&msg, counters);
            debug!("Block {}: From {} {}", index, sender, date);
            writer.write_message(&sender, &date, content)?;
        }

        let written = writer.message_count();
        writer.finish()?;
        debug!("Pass 1 wrote {} messages", written);
        Ok(())
    }

    /// Pass 2: re-read the intermediate mbox and normalize each message.
    fn normalize_messages<W: Write>(
        &self,
        intermediate: &File,
        output: &mut W,
        counters: &mut SummaryCounters,
    ) -> Result<()> {
        info!("→ Pass 2: normalizing headers");
        let reader = MboxReader::new(BufReader::new(intermediate), FromEscaping::Mboxrd);
        let mut writer = MboxWriter::new(output, self.output_escaping);

        for (index, entry) in reader.enumerate() {
            let entry = entry?;
            // every entry here already parsed in pass 1, so a failure means
            // the intermediate mbox itself is damaged
            let mut msg = ParsedMessage::parse(&entry.content).map_err(|e| {
                eyre!(
                    "Intermediate mbox entry #{} ({}) no longer parses: {}",
                    index + 1,
                    entry.envelope,
                    e
                )
            })?;
            counters.messages_seen += 1;

            let outcome = self.normalizer.normalize(&mut msg);
            if outcome.date_fixed {
                counters.dates_fixed += 1;
            }
            counters.metadata_headers_removed += outcome.metadata_removed;
            counters.threading_headers_restored += outcome.threading_restored;

            writer.write_entry(&entry.envelope, &msg.to_text())?;
        }

        writer.finish()?;
        Ok(())
    }

    fn envelope_date(&self, msg: &ParsedMessage, counters: &mut SummaryCounters) -> String {
        let raw = msg.get_unfolded("Date");
        match self.normalizer.dates().envelope_date(raw.as_deref()) {
            Some(date) => date,
            None => {
                debug!("No usable date in {:?}; using the epoch", raw);
                counters.epoch_fallbacks += 1;
                EPOCH_ENVELOPE_DATE.to_string()
            }
        }
    }

    fn handle_malformed(
        &self,
        index: usize,
        err: eyre::Report,
        counters: &mut SummaryCounters,
    ) -> Result<()> {
        match self.on_malformed {
            MalformedPolicy::Skip => {
                warn!("Skipping malformed message #{}: {}", index + 1, err);
                counters.malformed_skipped += 1;
                Ok(())
            }
            MalformedPolicy::Abort => Err(eyre!("Malformed message #{}: {}", index + 1, err)),
        }
    }
}
