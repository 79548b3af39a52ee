// src/date.rs

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

use crate::recovery::PartialDateRecovery;

/// An absolute point in time together with the offset it was written in.
/// Dates that carried no zone are pinned to `+00:00`.
pub type Timestamp = DateTime<FixedOffset>;

/// Envelope date used when nothing in the Date header can be recovered.
pub const EPOCH_ENVELOPE_DATE: &str = "Thu Jan 1 00:00:00 1970";

const ENVELOPE_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";
const HEADER_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^()]*\)").unwrap());

const WEEKDAYS: [&str; 14] = [
    "mon", "tue", "wed", "thu", "fri", "sat", "sun",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const MONTHS: [(&str, &str); 12] = [
    ("january", "Jan"),
    ("february", "Feb"),
    ("march", "Mar"),
    ("april", "Apr"),
    ("may", "May"),
    ("june", "Jun"),
    ("july", "Jul"),
    ("august", "Aug"),
    ("september", "Sep"),
    ("october", "Oct"),
    ("november", "Nov"),
    ("december", "Dec"),
];

/// One way of turning a date string into a timestamp.
pub trait DateStrategy: Send + Sync {
    /// Short label used in debug logging.
    fn name(&self) -> &str;

    /// Returns `None` when the input is not in this strategy's shape.
    fn try_parse(&self, input: &str) -> Option<Timestamp>;
}

/// RFC 2822 style mail dates, tolerant of the deviations seen in real archives:
/// single digit days, missing or wrong weekdays, full month names, obsolete
/// alphabetic zones, `(PDT)` style comments, missing seconds, missing zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct MailDateStrategy;

impl DateStrategy for MailDateStrategy {
    fn name(&self) -> &str {
        "rfc2822"
    }

    fn try_parse(&self, input: &str) -> Option<Timestamp> {
        let cleaned = normalize_mail_date(input);
        if cleaned.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(&cleaned) {
            return Some(dt);
        }

        // a weekday that disagrees with the date is ignored rather than fatal
        let no_weekday = strip_weekday(&cleaned);
        if let Ok(dt) = DateTime::parse_from_rfc2822(&no_weekday) {
            return Some(dt);
        }

        if let Ok(dt) = DateTime::parse_from_str(&no_weekday, "%d %b %Y %H:%M %z") {
            return Some(dt);
        }

        // no zone at all: the wall time is taken as UTC
        ["%d %b %Y %H:%M:%S", "%d %b %Y %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&no_weekday, fmt).ok())
            .map(as_utc)
    }
}

/// What a template yields once it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Carries its own `%z` offset.
    Zoned,
    /// Date and time, no zone.
    Naive,
    /// Date only, midnight.
    DateOnly,
}

/// A fixed `strftime`-style template.
#[derive(Debug, Clone)]
pub struct TemplateStrategy {
    format: &'static str,
    kind: TemplateKind,
}

impl TemplateStrategy {
    pub const fn new(format: &'static str, kind: TemplateKind) -> Self {
        Self { format, kind }
    }

    /// The explicit templates, most structured first.
    pub fn defaults() -> Vec<TemplateStrategy> {
        vec![
            TemplateStrategy::new("%Y/%m/%d", TemplateKind::DateOnly),
            TemplateStrategy::new("%a, %d %b %Y %H:%M:%S %z", TemplateKind::Zoned),
            TemplateStrategy::new("%d %b %Y %H:%M:%S %z", TemplateKind::Zoned),
            TemplateStrategy::new("%a %b %d %H:%M:%S %Y", TemplateKind::Naive),
            TemplateStrategy::new("%Y-%m-%d %H:%M:%S", TemplateKind::Naive),
            TemplateStrategy::new("%Y-%m-%d", TemplateKind::DateOnly),
        ]
    }
}

impl DateStrategy for TemplateStrategy {
    fn name(&self) -> &str {
        self.format
    }

    fn try_parse(&self, input: &str) -> Option<Timestamp> {
        if let Some(ts) = self.parse_with(input, self.format) {
            return Some(ts);
        }

        // chrono checks %a against the date; a wrong weekday must not sink it
        let format = self
            .format
            .strip_prefix("%a, ")
            .or_else(|| self.format.strip_prefix("%a "))?;
        self.parse_with(&strip_weekday(input), format)
    }
}

impl TemplateStrategy {
    fn parse_with(&self, input: &str, format: &str) -> Option<Timestamp> {
        match self.kind {
            TemplateKind::Zoned => DateTime::parse_from_str(input, format).ok(),
            TemplateKind::Naive => NaiveDateTime::parse_from_str(input, format)
                .ok()
                .map(as_utc),
            TemplateKind::DateOnly => NaiveDate::parse_from_str(input, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(as_utc),
        }
    }
}

/// Ordered cascade of date strategies; the first one that matches wins.
pub struct DateInterpreter {
    strategies: Vec<Box<dyn DateStrategy>>,
}

impl Default for DateInterpreter {
    fn default() -> Self {
        let mut strategies: Vec<Box<dyn DateStrategy>> = vec![Box::new(MailDateStrategy)];
        for template in TemplateStrategy::defaults() {
            strategies.push(Box::new(template));
        }
        Self { strategies }
    }
}

impl DateInterpreter {
    pub fn new(strategies: Vec<Box<dyn DateStrategy>>) -> Self {
        Self { strategies }
    }

    /// Best-effort interpretation of `input`. Never fails; `None` means no
    /// strategy recognised the string.
    pub fn interpret(&self, input: &str) -> Option<Timestamp> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        self.strategies.iter().find_map(|strategy| {
            let parsed = strategy.try_parse(input);
            if let Some(ts) = parsed {
                debug!("date '{}' matched {} → {}", input, strategy.name(), ts.to_rfc3339());
            }
            parsed
        })
    }
}

/// Full date repair: the interpreter cascade, then partial recovery.
#[derive(Default)]
pub struct DateFixer {
    interpreter: DateInterpreter,
    recovery: PartialDateRecovery,
}

impl DateFixer {
    pub fn new(interpreter: DateInterpreter, recovery: PartialDateRecovery) -> Self {
        Self { interpreter, recovery }
    }

    pub fn fix(&self, input: &str) -> Option<Timestamp> {
        self.interpreter
            .interpret(input)
            .or_else(|| self.recovery.recover(input))
    }

    /// ctime-style date for an mbox envelope line; `None` when unrecoverable.
    pub fn envelope_date(&self, input: Option<&str>) -> Option<String> {
        input.and_then(|s| self.fix(s)).map(|ts| envelope_date(&ts))
    }
}

/// `Thu May 21 05:33:29 1998`, in the timestamp's own offset.
pub fn envelope_date(ts: &Timestamp) -> String {
    ts.format(ENVELOPE_DATE_FORMAT).to_string()
}

/// Canonical Date header value, always rendered in GMT.
pub fn header_date(ts: &Timestamp) -> String {
    ts.with_timezone(&Utc).format(HEADER_DATE_FORMAT).to_string()
}

fn as_utc(naive: NaiveDateTime) -> Timestamp {
    Utc.from_utc_datetime(&naive).fixed_offset()
}

/// Drops comments, collapses whitespace and shortens full month names.
fn normalize_mail_date(input: &str) -> String {
    let without_comments = RE_COMMENT.replace_all(input, " ");
    without_comments
        .split_whitespace()
        .map(|token| {
            let bare = token.trim_end_matches([',', '.']).to_ascii_lowercase();
            MONTHS
                .iter()
                .find(|(long, _)| *long == bare)
                .map(|(_, short)| (*short).to_string())
                .unwrap_or_else(|| token.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_weekday(input: &str) -> String {
    match input.split_once(' ') {
        Some((first, rest)) if is_weekday(first) => rest.to_string(),
        _ => input.to_string(),
    }
}

fn is_weekday(token: &str) -> bool {
    let bare = token.trim_end_matches([',', '.']).to_ascii_lowercase();
    WEEKDAYS.contains(&bare.as_str())
}
