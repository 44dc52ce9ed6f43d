//! Stateful fuel tank and ticket history wrapped around the engines.
//!
//! The engines are pure; this ledger owns the "previous" wake event, the fuel
//! level and the append-only history, and moves them through a
//! [`KeyValueStore`] with a read-modify-write per flight.
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::config::{DebitPolicy, EconomyConfig, EngineKind};
use crate::constants::{
    KEY_CURRENT_TICKET, KEY_FUEL, KEY_LAST_DATE, KEY_LAST_EVENT, KEY_TICKETS,
};
use crate::geo::{GeoTicket, Location};
use crate::routes::{CityPair, pick_cities};
use crate::storage::{KeyValueStore, WriteBatch};
use crate::ticket::{Direction, TicketError, TicketOptions};
use crate::time_delta::TimeTicket;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The moment the user "took off": a wake time or a wake location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeEvent {
    Clock(ClockTime),
    Place(Location),
}

impl WakeEvent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Clock(_) => "clock",
            Self::Place(_) => "place",
        }
    }
}

/// A ticket from whichever engine is the system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ticket {
    TimeDelta(TimeTicket),
    Geo(GeoTicket),
}

impl Ticket {
    #[must_use]
    pub const fn fuel_used(&self) -> u32 {
        match self {
            Self::TimeDelta(t) => t.fuel_used,
            Self::Geo(t) => t.fuel_used,
        }
    }

    #[must_use]
    pub const fn distance_km(&self) -> u32 {
        match self {
            Self::TimeDelta(t) => t.distance_km,
            Self::Geo(t) => t.distance_km,
        }
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::TimeDelta(t) => t.direction,
            Self::Geo(t) => t.direction,
        }
    }

    #[must_use]
    pub fn narrative(&self) -> &str {
        match self {
            Self::TimeDelta(t) => &t.narrative,
            Self::Geo(t) => &t.narrative,
        }
    }

    #[must_use]
    pub const fn class_label(&self) -> &'static str {
        match self {
            Self::TimeDelta(t) => t.ticket_type.label(),
            Self::Geo(t) => t.ticket_type.label(),
        }
    }
}

/// One charged flight in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub date: NaiveDate,
    pub ticket: Ticket,
    /// Decorative city pair for time-delta tickets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<CityPair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightLog {
    config: EconomyConfig,
    fuel: u32,
    last_event: Option<WakeEvent>,
    last_date: Option<NaiveDate>,
    history: Vec<LogEntry>,
    current: Option<Ticket>,
}

impl FlightLog {
    /// Fresh log with the configured initial fuel (capped at capacity).
    #[must_use]
    pub fn new(config: EconomyConfig) -> Self {
        let fuel = config.initial_fuel.min(config.fuel_capacity);
        Self {
            config,
            fuel,
            last_event: None,
            last_date: None,
            history: Vec::new(),
            current: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    #[must_use]
    pub const fn fuel(&self) -> u32 {
        self.fuel
    }

    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.config.fuel_capacity
    }

    #[must_use]
    pub fn history(&self) -> &[LogEntry] {
        &self.history
    }

    #[must_use]
    pub const fn current_ticket(&self) -> Option<&Ticket> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn last_event(&self) -> Option<&WakeEvent> {
        self.last_event.as_ref()
    }

    #[must_use]
    pub const fn last_processed_date(&self) -> Option<NaiveDate> {
        self.last_date
    }

    /// Set the tank level, clamped to `[0, capacity]`.
    pub fn set_fuel(&mut self, value: u32) {
        self.fuel = value.min(self.capacity());
    }

    /// Add fuel up to capacity; returns the new level.
    pub fn credit(&mut self, amount: u32) -> u32 {
        self.fuel = self.fuel.saturating_add(amount).min(self.capacity());
        self.fuel
    }

    /// Whether a flight on `date` would skip the debit.
    #[must_use]
    pub fn charged_on(&self, date: NaiveDate) -> bool {
        self.config.debit_policy == DebitPolicy::OncePerDay && self.last_date == Some(date)
    }

    /// Price a flight from the stored previous event without touching state.
    ///
    /// # Errors
    ///
    /// See [`issue_ticket`].
    pub fn price(&self, current: &WakeEvent, options: TicketOptions) -> Result<Ticket, TicketError> {
        issue_ticket(&self.config, self.last_event.as_ref(), current, options)
    }

    /// Issue a ticket for `current`, debit the tank (floored at zero), record
    /// history, and remember `current` as the next previous event.
    ///
    /// Under [`DebitPolicy::OncePerDay`] a repeat flight on the same date is
    /// priced and returned but neither charged nor recorded.
    ///
    /// # Errors
    ///
    /// Propagates [`FlightLog::price`] failures; state is untouched on error.
    pub fn generate(
        &mut self,
        current: WakeEvent,
        today: NaiveDate,
        options: TicketOptions,
    ) -> Result<Ticket, TicketError> {
        let ticket = self.price(&current, options)?;

        if self.charged_on(today) {
            info!("flight already charged on {today}; fuel stays at {}", self.fuel);
        } else {
            let before = self.fuel;
            self.fuel = before.saturating_sub(ticket.fuel_used()).min(self.capacity());
            self.last_date = Some(today);
            let route = match &ticket {
                Ticket::TimeDelta(t) => Some(pick_cities(t.distance_km, today.day())),
                Ticket::Geo(_) => None,
            };
            self.history.push(LogEntry {
                date: today,
                ticket: ticket.clone(),
                route,
            });
            info!(
                "charged {} fuel for {} ({before} -> {})",
                ticket.fuel_used(),
                ticket.class_label(),
                self.fuel
            );
        }

        self.last_event = Some(current);
        self.current = Some(ticket.clone());
        Ok(ticket)
    }

    /// Forget today's charge so the next flight debits again.
    pub fn reset_today(&mut self) {
        self.last_date = None;
    }

    /// Back to a fresh tank with no previous event and no history.
    pub fn reset_all(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Rebuild a log from the store. Corrupt values are logged and replaced
    /// by defaults; only store I/O errors surface.
    ///
    /// # Errors
    ///
    /// Returns the store's error if a read fails.
    pub fn load<S: KeyValueStore>(config: EconomyConfig, store: &S) -> Result<Self, S::Error> {
        let mut log = Self::new(config);

        if let Some(raw) = store.get(KEY_FUEL)? {
            match raw.trim().parse::<u32>() {
                Ok(value) => log.set_fuel(value),
                Err(err) => warn!("ignoring corrupt {KEY_FUEL} {raw:?}: {err}"),
            }
        }

        log.last_event = read_last_event(store)?;

        if let Some(raw) = store.get(KEY_LAST_DATE)? {
            match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
                Ok(date) => log.last_date = Some(date),
                Err(err) => warn!("ignoring corrupt {KEY_LAST_DATE} {raw:?}: {err}"),
            }
        }

        log.history = read_json::<S, Vec<LogEntry>>(store, KEY_TICKETS)?.unwrap_or_default();
        log.current = read_json(store, KEY_CURRENT_TICKET)?;

        debug!(
            "flight log loaded: fuel {}, {} flights",
            log.fuel,
            log.history.len()
        );
        Ok(log)
    }

    /// Persist every key in one batch; absent values are removed.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the commit fails; nothing is written then.
    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<(), S::Error> {
        let mut batch = WriteBatch::new();
        batch.set(KEY_FUEL, self.fuel.to_string());

        match &self.last_event {
            Some(event) => stage_json(&mut batch, KEY_LAST_EVENT, event),
            None => batch.remove(KEY_LAST_EVENT),
        }

        match self.last_date {
            Some(date) => batch.set(KEY_LAST_DATE, date.format(DATE_FORMAT).to_string()),
            None => batch.remove(KEY_LAST_DATE),
        }

        if self.history.is_empty() {
            batch.remove(KEY_TICKETS);
        } else {
            stage_json(&mut batch, KEY_TICKETS, &self.history);
        }

        match &self.current {
            Some(ticket) => stage_json(&mut batch, KEY_CURRENT_TICKET, ticket),
            None => batch.remove(KEY_CURRENT_TICKET),
        }

        store.commit(batch)
    }
}

/// Stateless pricing with the configured engine. A previous event of the
/// other kind is treated as no previous event.
///
/// # Errors
///
/// [`TicketError::MissingLocation`] when the geo engine gets no location;
/// [`TicketError::EventMismatch`] when the time-delta engine gets one.
pub fn issue_ticket(
    config: &EconomyConfig,
    previous: Option<&WakeEvent>,
    current: &WakeEvent,
    options: TicketOptions,
) -> Result<Ticket, TicketError> {
    match config.engine {
        EngineKind::TimeDelta => {
            let WakeEvent::Clock(curr) = current else {
                return Err(TicketError::EventMismatch {
                    engine: EngineKind::TimeDelta.as_str(),
                    event: current.kind(),
                });
            };
            let prev = match previous {
                Some(WakeEvent::Clock(time)) => Some(*time),
                _ => None,
            };
            Ok(Ticket::TimeDelta(
                config.time_engine().issue(prev, *curr, options),
            ))
        }
        EngineKind::Geo => {
            let curr = match current {
                WakeEvent::Place(location) => Some(location),
                WakeEvent::Clock(_) => None,
            };
            let prev = match previous {
                Some(WakeEvent::Place(location)) => Some(location),
                _ => None,
            };
            config.geo_engine().issue(prev, curr, options).map(Ticket::Geo)
        }
    }
}

// Older saves stored the bare HHMM string.
fn read_last_event<S: KeyValueStore>(store: &S) -> Result<Option<WakeEvent>, S::Error> {
    let Some(raw) = store.get(KEY_LAST_EVENT)? else {
        return Ok(None);
    };
    if let Ok(event) = serde_json::from_str::<WakeEvent>(&raw) {
        return Ok(Some(event));
    }
    match raw.trim().parse::<ClockTime>() {
        Ok(time) => Ok(Some(WakeEvent::Clock(time))),
        Err(err) => {
            warn!("ignoring corrupt {KEY_LAST_EVENT} {raw:?}: {err}");
            Ok(None)
        }
    }
}

fn read_json<S: KeyValueStore, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, S::Error> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!("ignoring corrupt {key}: {err}");
            Ok(None)
        }
    }
}

fn stage_json<T: Serialize>(batch: &mut WriteBatch, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => batch.set(key, json),
        Err(err) => warn!("skipping unserializable {key}: {err}"),
    }
}
