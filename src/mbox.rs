// src/mbox.rs
//
// Minimal mbox container: an envelope-line writer and a reader for archives
// this crate wrote itself.

use eyre::{eyre, Result};
use serde::Deserialize;
use std::io::{BufRead, Write};

/// How body lines that look like envelope lines are protected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FromEscaping {
    /// Only `From ` lines get a `>`; existing `>From ` lines are left alone.
    #[default]
    Mboxo,
    /// Any `>*From ` line gets one more `>`, which makes the escaping reversible.
    Mboxrd,
}

impl FromEscaping {
    fn needs_escape(&self, line: &str) -> bool {
        match self {
            FromEscaping::Mboxo => line.starts_with("From "),
            FromEscaping::Mboxrd => line.trim_start_matches('>').starts_with("From "),
        }
    }

    fn unescape<'a>(&self, line: &'a str) -> &'a str {
        let escaped = match self {
            FromEscaping::Mboxo => line.starts_with(">From "),
            FromEscaping::Mboxrd => {
                line.starts_with('>') && line.trim_start_matches('>').starts_with("From ")
            }
        };
        if escaped {
            &line[1..]
        } else {
            line
        }
    }
}

/// `From <sender> <date>`
pub fn envelope_line(sender: &str, date: &str) -> String {
    format!("From {} {}", sender, date)
}

pub struct MboxWriter<W: Write> {
    writer: W,
    escaping: FromEscaping,
    message_count: u64,
}

impl<W: Write> MboxWriter<W> {
    pub fn new(writer: W, escaping: FromEscaping) -> Self {
        Self {
            writer,
            escaping,
            message_count: 0,
        }
    }

    /// Write one message under its envelope line, followed by a blank line.
    pub fn write_message(&mut self, sender: &str, date: &str, content: &str) -> Result<()> {
        self.write_entry(&envelope_line(sender, date), content)
    }

    /// Write one message under an already formatted envelope line.
    pub fn write_entry(&mut self, envelope: &str, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", envelope)?;

        for line in content.trim_end_matches('\n').split('\n') {
            if self.escaping.needs_escape(line) {
                self.writer.write_all(b">")?;
            }
            self.writer.write_all(line.as_bytes())?;
            self.writer.write_all(b"\n")?;
        }
        writeln!(self.writer)?;

        self.message_count += 1;
        Ok(())
    }

    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Flush and hand back the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| eyre!("Failed to flush mbox output: {}", e))?;
        Ok(self.writer)
    }
}

/// One mbox entry: the envelope line without its newline, and the message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MboxEntry {
    pub envelope: String,
    pub content: String,
}

impl MboxEntry {
    /// Sender and date parts of the envelope line.
    pub fn envelope_parts(&self) -> (&str, &str) {
        let rest = self.envelope.strip_prefix("From ").unwrap_or(&self.envelope);
        rest.split_once(' ').unwrap_or((rest, ""))
    }
}

/// Reads entries separated by `From ` lines. Anything before the first
/// envelope line is ignored.
pub struct MboxReader<R: BufRead> {
    reader: R,
    escaping: FromEscaping,
    pending_envelope: Option<String>,
    done: bool,
}

impl<R: BufRead> MboxReader<R> {
    pub fn new(reader: R, escaping: FromEscaping) -> Self {
        Self {
            reader,
            escaping,
            pending_envelope: None,
            done: false,
        }
    }

    fn read_entry(&mut self) -> Result<Option<MboxEntry>> {
        let mut content = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| eyre!("Failed to read mbox entry: {}", e))?;
            if read == 0 {
                self.done = true;
                break;
            }
            let text = line.trim_end_matches(['\r', '\n']);
            if text.starts_with("From ") {
                let previous = self.pending_envelope.replace(text.to_string());
                if previous.is_some() {
                    return Ok(previous.map(|envelope| finish_entry(envelope, content)));
                }
                continue;
            }
            if self.pending_envelope.is_some() {
                content.push_str(self.escaping.unescape(text));
                content.push('\n');
            }
        }
        Ok(self
            .pending_envelope
            .take()
            .map(|envelope| finish_entry(envelope, content)))
    }
}

fn finish_entry(envelope: String, mut content: String) -> MboxEntry {
    // the writer's blank separator line
    if content.ends_with("\n\n") {
        content.pop();
    }
    MboxEntry { envelope, content }
}

impl<R: BufRead> Iterator for MboxReader<R> {
    type Item = Result<MboxEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done && self.pending_envelope.is_none() {
            return None;
        }
        self.read_entry().transpose()
    }
}
