//! Types shared by both ticket engines: direction, modifiers, and errors.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which way the notional flight went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Woke earlier than last time (or flew to a greater longitude).
    Eastbound,
    /// Woke later than last time (or flew to a smaller longitude).
    Westbound,
    /// No movement: identical wake time, or no previous event.
    Local,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eastbound => "EASTBOUND",
            Self::Westbound => "WESTBOUND",
            Self::Local => "LOCAL",
        }
    }

    /// Arrow shown on the boarding card.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eastbound => "←",
            Self::Westbound => "→",
            Self::Local => "○",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fuel-cost modifiers. Every flag defaults to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketOptions {
    /// x1.2 when the current wake time is in the night window.
    #[serde(default)]
    pub night_penalty: bool,
    /// x0.9 consistency reward, applied after the night penalty.
    #[serde(default)]
    pub streak_bonus: bool,
    /// Zero-cost registration ticket when there is no previous event.
    #[serde(default)]
    pub first_day_free: bool,
}

impl TicketOptions {
    #[must_use]
    pub const fn with_night_penalty(mut self, enabled: bool) -> Self {
        self.night_penalty = enabled;
        self
    }

    #[must_use]
    pub const fn with_streak_bonus(mut self, enabled: bool) -> Self {
        self.streak_bonus = enabled;
        self
    }

    #[must_use]
    pub const fn with_first_day_free(mut self, enabled: bool) -> Self {
        self.first_day_free = enabled;
        self
    }
}

/// What was wrong with a clock-time string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatIssue {
    #[error("expected four digits with an optional colon")]
    Shape,
    #[error("hour must be between 00 and 23")]
    Hour,
    #[error("minute must be between 00 and 59")]
    Minute,
}

/// Reasons an engine refuses to issue a ticket. No partial ticket is ever
/// produced alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    #[error("invalid clock time {input:?}: {issue}")]
    InvalidFormat { input: String, issue: FormatIssue },
    #[error("a current location is required to issue a geo ticket")]
    MissingLocation,
    #[error("the {engine} engine cannot fly from a {event} wake event")]
    EventMismatch {
        engine: &'static str,
        event: &'static str,
    },
}

impl TicketError {
    pub(crate) fn invalid(input: &str, issue: FormatIssue) -> Self {
        Self::InvalidFormat {
            input: input.to_string(),
            issue,
        }
    }
}
