//! Wake Up Airlines economy engine
//!
//! Platform-agnostic flight-ticket calculator: turns consecutive wake-up
//! events into tickets with distance, fuel, direction and a narrative, and
//! keeps a fuel tank with history behind a key-value store seam.
//! This crate performs no I/O of its own.

pub mod announce;
pub mod boarding;
pub mod clock;
pub mod config;
pub mod constants;
pub mod flight_log;
pub mod geo;
pub mod numbers;
pub mod routes;
pub mod storage;
pub mod ticket;
pub mod time_delta;

// Re-export commonly used types
pub use announce::{
    AnnouncementError, AnnouncementRequest, AnnouncementResponse, AnnouncementType,
    NarrativeAugmenter, announce,
};
pub use boarding::BoardingPass;
pub use clock::{
    ClockTime, FixedClock, SystemClock, TimeSource, format_current_clock_time,
    format_time_with_colon, is_night_by_hhmm, normalize_clock_text, parse_clock_time,
};
pub use config::{ConfigError, DebitPolicy, EconomyConfig, EngineKind};
pub use flight_log::{FlightLog, LogEntry, Ticket, WakeEvent, issue_ticket};
pub use geo::{GeoEngine, GeoTicket, GeoTicketClass, Location, haversine_km, make_geo_ticket};
pub use routes::{CityPair, pick_cities};
pub use storage::{KeyValueStore, MemoryStore, WriteBatch};
pub use ticket::{Direction, FormatIssue, TicketError, TicketOptions};
pub use time_delta::{TimeDeltaEngine, TimeTicket, TimeTicketClass, make_ticket};

use chrono::NaiveDate;
use thiserror::Error;

/// Failure of a stored flight: either pricing or the store itself.
#[derive(Debug, Error)]
pub enum DeskError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Ticket(#[from] TicketError),
    #[error("flight log storage failed: {0}")]
    Storage(#[source] E),
}

/// Check-in desk: a [`FlightLog`] bound to a store, reloaded and saved
/// around every operation.
pub struct FlightDesk<S>
where
    S: KeyValueStore,
{
    config: EconomyConfig,
    store: S,
}

impl<S> FlightDesk<S>
where
    S: KeyValueStore,
{
    pub const fn new(config: EconomyConfig, store: S) -> Self {
        Self { config, store }
    }

    #[must_use]
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Current persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn log(&self) -> Result<FlightLog, S::Error> {
        FlightLog::load(self.config.clone(), &self.store)
    }

    /// Load, issue a ticket for `current`, and save.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Ticket`] when pricing fails (nothing is written)
    /// or [`DeskError::Storage`] when the store fails.
    pub fn fly(
        &mut self,
        current: WakeEvent,
        today: NaiveDate,
        options: TicketOptions,
    ) -> Result<Ticket, DeskError<S::Error>> {
        let mut log = self.log().map_err(DeskError::Storage)?;
        let ticket = log.generate(current, today, options)?;
        log.save(&mut self.store).map_err(DeskError::Storage)?;
        Ok(ticket)
    }

    /// Apply `edit` to the stored log and save it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn update<T>(&mut self, edit: impl FnOnce(&mut FlightLog) -> T) -> Result<T, S::Error> {
        let mut log = self.log()?;
        let out = edit(&mut log);
        log.save(&mut self.store)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    /// Store whose Nth individual write (counted across commits) fails,
    /// rejecting the whole batch it belongs to.
    #[derive(Default)]
    struct FlakyStore {
        entries: BTreeMap<String, String>,
        writes: usize,
        fail_on_write: Option<usize>,
    }

    impl KeyValueStore for FlakyStore {
        type Error = DiskFull;

        fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
            Ok(self.entries.get(key).cloned())
        }

        fn commit(&mut self, batch: WriteBatch) -> Result<(), Self::Error> {
            let first = self.writes + 1;
            self.writes += batch.len();
            if self
                .fail_on_write
                .is_some_and(|n| (first..=self.writes).contains(&n))
            {
                return Err(DiskFull);
            }
            batch.apply_to(&mut self.entries);
            Ok(())
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn at(text: &str) -> WakeEvent {
        WakeEvent::Clock(text.parse().unwrap())
    }

    #[test]
    fn desk_persists_between_flights() {
        let mut desk = FlightDesk::new(EconomyConfig::default(), MemoryStore::new());
        desk.fly(at("0830"), date(1), TicketOptions::default())
            .unwrap();
        let second = desk
            .fly(at("0800"), date(2), TicketOptions::default())
            .unwrap();
        assert_eq!(second.direction(), Direction::Eastbound);

        let log = desk.log().unwrap();
        assert_eq!(log.history().len(), 2);
        assert_eq!(log.fuel(), 100 - 5 - second.fuel_used());
    }

    #[test]
    fn update_edits_the_stored_tank() {
        let mut desk = FlightDesk::new(EconomyConfig::default(), MemoryStore::new());
        let level = desk.update(|log| log.credit(5)).unwrap();
        assert_eq!(level, 105);
        desk.update(FlightLog::reset_all).unwrap();
        assert_eq!(desk.log().unwrap().fuel(), 100);
    }

    #[test]
    fn pricing_errors_write_nothing() {
        let mut desk = FlightDesk::new(EconomyConfig::legacy_game(), MemoryStore::new());
        let err = desk
            .fly(at("0830"), date(1), TicketOptions::default())
            .unwrap_err();
        assert!(matches!(err, DeskError::Ticket(TicketError::MissingLocation)));
        assert!(desk.store().is_empty());
    }

    #[test]
    fn storage_errors_surface() {
        let store = FlakyStore {
            fail_on_write: Some(1),
            ..FlakyStore::default()
        };
        let mut desk = FlightDesk::new(EconomyConfig::default(), store);
        let err = desk
            .fly(at("0830"), date(1), TicketOptions::default())
            .unwrap_err();
        assert!(matches!(err, DeskError::Storage(DiskFull)));
        assert_eq!(err.to_string(), "flight log storage failed: disk full");
    }

    #[test]
    fn failed_save_leaves_no_partial_debit() {
        let store = FlakyStore {
            fail_on_write: Some(3),
            ..FlakyStore::default()
        };
        let mut desk = FlightDesk::new(EconomyConfig::default(), store);
        let err = desk
            .fly(at("0830"), date(1), TicketOptions::default())
            .unwrap_err();
        assert!(matches!(err, DeskError::Storage(DiskFull)));
        assert!(desk.store().entries.is_empty());
        assert_eq!(desk.log().unwrap(), FlightLog::new(EconomyConfig::default()));

        let retry = desk
            .fly(at("0830"), date(1), TicketOptions::default())
            .unwrap();
        assert_eq!(retry.fuel_used(), 5);
        let log = desk.log().unwrap();
        assert_eq!(log.fuel(), 95);
        assert_eq!(log.history().len(), 1);
        assert!(log.charged_on(date(1)));
    }
}
