// src/recovery.rs

use chrono::{NaiveDate, TimeZone, Utc};
use log::debug;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::date::{DateStrategy, Timestamp};

static RE_YEAR_MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{4})[/-]([0-9]{1,2})[/-]([0-9]{1,2})").unwrap());

static RE_DAY_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{4})").unwrap());

static RE_WRITTEN_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+([0-9]{1,2}),?\s+([0-9]{4})\b",
    )
    .unwrap()
});

/// A single extraction pattern over a date string that no parser accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryPattern {
    /// `YYYY/MM/DD` or `YYYY-MM-DD` anywhere in the string; kept in full.
    YearMonthDay,
    /// `DD/MM/YYYY`; day and month order is unknowable, so only the year is kept.
    DayMonthYear,
    /// `Month DD, YYYY`; only the year is kept.
    WrittenMonth,
}

impl RecoveryPattern {
    fn regex(&self) -> &'static Regex {
        match self {
            RecoveryPattern::YearMonthDay => &*RE_YEAR_MONTH_DAY,
            RecoveryPattern::DayMonthYear => &*RE_DAY_MONTH_YEAR,
            RecoveryPattern::WrittenMonth => &*RE_WRITTEN_DATE,
        }
    }

    fn build(&self, caps: &Captures) -> Option<NaiveDate> {
        match self {
            RecoveryPattern::YearMonthDay => {
                let year = group(caps, 1)?;
                let month = group(caps, 2)?;
                let day = group(caps, 3)?;
                calendar_date(year, month, day)
            }
            RecoveryPattern::DayMonthYear | RecoveryPattern::WrittenMonth => {
                calendar_date(group(caps, 3)?, 1, 1)
            }
        }
    }
}

impl DateStrategy for RecoveryPattern {
    fn name(&self) -> &str {
        match self {
            RecoveryPattern::YearMonthDay => "partial YYYY/MM/DD",
            RecoveryPattern::DayMonthYear => "partial DD/MM/YYYY",
            RecoveryPattern::WrittenMonth => "partial Month DD, YYYY",
        }
    }

    fn try_parse(&self, input: &str) -> Option<Timestamp> {
        let caps = self.regex().captures(input)?;
        let date = self.build(&caps)?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(Utc.from_utc_datetime(&midnight).fixed_offset())
    }
}

/// Last-resort date extraction for strings the interpreter gave up on.
///
/// Patterns run in order and the first that yields a real calendar date wins.
/// Ambiguous forms degrade to January 1st of the captured year instead of
/// guessing day and month.
#[derive(Debug, Clone)]
pub struct PartialDateRecovery {
    patterns: Vec<RecoveryPattern>,
}

impl Default for PartialDateRecovery {
    fn default() -> Self {
        Self {
            patterns: vec![
                RecoveryPattern::YearMonthDay,
                RecoveryPattern::DayMonthYear,
                RecoveryPattern::WrittenMonth,
            ],
        }
    }
}

impl PartialDateRecovery {
    pub fn recover(&self, input: &str) -> Option<Timestamp> {
        self.patterns.iter().find_map(|pattern| {
            let recovered = pattern.try_parse(input);
            if let Some(ts) = recovered {
                debug!("recovered '{}' via {} → {}", input, pattern.name(), ts.to_rfc3339());
            }
            recovered
        })
    }
}

fn group(caps: &Captures, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn calendar_date(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    if year == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}
