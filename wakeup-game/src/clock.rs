//! Wall-clock handling: HHMM parsing, normalization, and the night window.
//!
//! Every value here is a time of day with no date attached. The engines never
//! read a clock themselves; callers hand in an instant (or a [`TimeSource`])
//! and get an HHMM value back.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_TARGET_WAKE_MINUTES, HALF_DAY_MINUTES, MINUTES_PER_DAY, NIGHT_ENDS_HOUR,
    NIGHT_STARTS_HOUR,
};
use crate::ticket::{FormatIssue, TicketError};

static CLOCK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<hour>\d{1,2}):(?P<minute>\d{2})|(?P<hh>\d{2})(?P<mm>\d{2})|(?P<bare>\d{1,2}))\s*(?P<meridiem>[AaPp][Mm])?$",
    )
    .expect("clock text pattern is valid")
});

/// A time of day with minute precision, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: Self = Self(0);

    /// Default target wake time used for phase error (08:00).
    pub const TARGET_WAKE: Self = Self(DEFAULT_TARGET_WAKE_MINUTES);

    /// Build from an hour and minute, rejecting out-of-range parts.
    #[must_use]
    pub const fn new(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self(hour * 60 + minute))
    }

    #[must_use]
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes as i32 >= MINUTES_PER_DAY {
            return None;
        }
        Some(Self(minutes))
    }

    /// Read the wall-clock hour and minute of any chrono instant.
    #[must_use]
    pub fn from_timelike<T: Timelike>(instant: &T) -> Self {
        // chrono guarantees hour < 24 and minute < 60
        let hour = u16::try_from(instant.hour()).unwrap_or(0);
        let minute = u16::try_from(instant.minute()).unwrap_or(0);
        Self(hour * 60 + minute)
    }

    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    #[must_use]
    pub const fn minute(self) -> u16 {
        self.0 % 60
    }

    /// `HH:MM` rendering; [`fmt::Display`] renders `HHMM`.
    #[must_use]
    pub fn with_colon(self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    /// Night window for the penalty: 00:00–02:59 and 12:00–23:59.
    #[must_use]
    pub const fn is_night(self) -> bool {
        let hour = self.hour();
        hour < NIGHT_ENDS_HOUR || hour >= NIGHT_STARTS_HOUR
    }

    /// Signed minutes from `base` to `self`, wrapped into `[-720, 720]`.
    #[must_use]
    pub fn wrapped_delta_from(self, base: Self) -> i32 {
        let mut delta = i32::from(self.0) - i32::from(base.0);
        if delta > HALF_DAY_MINUTES {
            delta -= MINUTES_PER_DAY;
        }
        if delta < -HALF_DAY_MINUTES {
            delta += MINUTES_PER_DAY;
        }
        delta
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_clock_time(s).map(Self)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TicketError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Parse a strict four-digit time (`"0830"` or `"08:30"`) into minutes since
/// midnight.
///
/// # Errors
///
/// Returns [`TicketError::InvalidFormat`] when the text, minus one optional
/// colon, is not exactly four ASCII digits, or when the hour or minute is out
/// of range.
pub fn parse_clock_time(text: &str) -> Result<u16, TicketError> {
    let clean = text.replacen(':', "", 1);
    if clean.len() != 4 || !clean.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TicketError::invalid(text, FormatIssue::Shape));
    }
    let hour: u16 = clean[..2]
        .parse()
        .map_err(|_| TicketError::invalid(text, FormatIssue::Shape))?;
    let minute: u16 = clean[2..]
        .parse()
        .map_err(|_| TicketError::invalid(text, FormatIssue::Shape))?;
    if hour > 23 {
        return Err(TicketError::invalid(text, FormatIssue::Hour));
    }
    if minute > 59 {
        return Err(TicketError::invalid(text, FormatIssue::Minute));
    }
    Ok(hour * 60 + minute)
}

/// Lenient parser for user-entered times: `"8:30"`, `"0830"`, `"8:30 PM"`,
/// `"12:05 am"`, `"7pm"`. Without AM/PM the text needs a colon or exactly four
/// digits, so `"123"` is rejected.
///
/// # Errors
///
/// Returns [`TicketError::InvalidFormat`] when the text does not look like a
/// time or names an impossible hour/minute.
pub fn normalize_clock_text(text: &str) -> Result<ClockTime, TicketError> {
    let trimmed = text.trim();
    let caps = CLOCK_TEXT
        .captures(trimmed)
        .ok_or_else(|| TicketError::invalid(text, FormatIssue::Shape))?;

    // A bare hour ("7") only reads as a time next to AM/PM.
    if caps.name("bare").is_some() && caps.name("meridiem").is_none() {
        return Err(TicketError::invalid(text, FormatIssue::Shape));
    }
    let number = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| caps.name(name))
            .map_or(Ok(0), |m| m.as_str().parse::<u16>())
            .map_err(|_| TicketError::invalid(text, FormatIssue::Shape))
    };
    let mut hour = number(&["hour", "hh", "bare"])?;
    let minute = number(&["minute", "mm"])?;

    if let Some(meridiem) = caps.name("meridiem") {
        if !(1..=12).contains(&hour) {
            return Err(TicketError::invalid(text, FormatIssue::Hour));
        }
        let is_pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        hour = match (is_pm, hour) {
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, 12) => 0,
            (false, h) => h,
        };
    }

    if hour > 23 {
        return Err(TicketError::invalid(text, FormatIssue::Hour));
    }
    ClockTime::new(hour, minute).ok_or_else(|| TicketError::invalid(text, FormatIssue::Minute))
}

/// Zero-padded `HHMM` for the wall-clock time of `instant`.
#[must_use]
pub fn format_current_clock_time<T: Timelike>(instant: &T) -> String {
    ClockTime::from_timelike(instant).to_string()
}

/// Zero-padded `HH:MM` for the wall-clock time of `instant`.
#[must_use]
pub fn format_time_with_colon<T: Timelike>(instant: &T) -> String {
    ClockTime::from_timelike(instant).with_colon()
}

/// Night check straight from HHMM text.
///
/// # Errors
///
/// Propagates [`parse_clock_time`] failures.
pub fn is_night_by_hhmm(text: &str) -> Result<bool, TicketError> {
    text.parse::<ClockTime>().map(ClockTime::is_night)
}

/// Source of "now" for callers; swap in [`FixedClock`] for deterministic runs.
pub trait TimeSource {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl TimeSource for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
