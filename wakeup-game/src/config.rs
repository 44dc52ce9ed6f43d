//! Economy configuration: which engine is the system of record, how the fuel
//! tank behaves, and where home is.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::ClockTime;
use crate::constants::{
    DEFAULT_FUEL_CAPACITY, DEFAULT_INITIAL_FUEL, DEFAULT_MONEY_PER_FUEL, LEGACY_FUEL_CAPACITY,
};
use crate::geo::{GeoEngine, Location};
use crate::time_delta::TimeDeltaEngine;

/// Engine that prices flights for the flight log. Exactly one is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    TimeDelta,
    Geo,
}

impl EngineKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeDelta => "time-delta",
            Self::Geo => "geo",
        }
    }
}

/// When a generated ticket is charged against the tank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebitPolicy {
    /// Only the first ticket of a calendar day debits fuel and enters history.
    #[default]
    OncePerDay,
    /// Every ticket debits fuel.
    EveryCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyConfig {
    #[serde(default)]
    pub engine: EngineKind,
    #[serde(default)]
    pub debit_policy: DebitPolicy,
    #[serde(default = "EconomyConfig::default_fuel_capacity")]
    pub fuel_capacity: u32,
    #[serde(default = "EconomyConfig::default_initial_fuel")]
    pub initial_fuel: u32,
    #[serde(default = "EconomyConfig::default_money_per_fuel")]
    pub money_per_fuel: u32,
    #[serde(default = "Location::home_base")]
    pub home_base: Location,
    #[serde(default = "EconomyConfig::default_target_wake")]
    pub target_wake: ClockTime,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            debit_policy: DebitPolicy::default(),
            fuel_capacity: Self::default_fuel_capacity(),
            initial_fuel: Self::default_initial_fuel(),
            money_per_fuel: Self::default_money_per_fuel(),
            home_base: Location::home_base(),
            target_wake: Self::default_target_wake(),
        }
    }
}

impl EconomyConfig {
    #[must_use]
    pub const fn default_fuel_capacity() -> u32 {
        DEFAULT_FUEL_CAPACITY
    }

    #[must_use]
    pub const fn default_initial_fuel() -> u32 {
        DEFAULT_INITIAL_FUEL
    }

    #[must_use]
    pub const fn default_money_per_fuel() -> u32 {
        DEFAULT_MONEY_PER_FUEL
    }

    #[must_use]
    pub const fn default_target_wake() -> ClockTime {
        ClockTime::TARGET_WAKE
    }

    /// The destination-game tank: geo pricing, 1000 capacity, starts full,
    /// every flight charged.
    #[must_use]
    pub fn legacy_game() -> Self {
        Self {
            engine: EngineKind::Geo,
            debit_policy: DebitPolicy::EveryCall,
            fuel_capacity: LEGACY_FUEL_CAPACITY,
            initial_fuel: LEGACY_FUEL_CAPACITY,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed JSON or out-of-range values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate tank bounds and the home base.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates its bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fuel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.initial_fuel > self.fuel_capacity {
            return Err(ConfigError::InitialAboveCapacity {
                initial: self.initial_fuel,
                capacity: self.fuel_capacity,
            });
        }
        if !self.home_base.has_valid_coordinates() {
            return Err(ConfigError::HomeBaseOutOfRange {
                latitude: self.home_base.latitude,
                longitude: self.home_base.longitude,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn time_engine(&self) -> TimeDeltaEngine {
        TimeDeltaEngine::new(self.target_wake)
    }

    #[must_use]
    pub fn geo_engine(&self) -> GeoEngine {
        GeoEngine::new(self.home_base.clone(), self.money_per_fuel)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("economy config could not be parsed: {0}")]
    Parse(String),
    #[error("fuel capacity must be at least 1")]
    ZeroCapacity,
    #[error("initial fuel {initial} exceeds tank capacity {capacity}")]
    InitialAboveCapacity { initial: u32, capacity: u32 },
    #[error("home base coordinates out of range (lat {latitude:.4}, lon {longitude:.4})")]
    HomeBaseOutOfRange { latitude: f64, longitude: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_flight_widget() {
        let cfg = EconomyConfig::default();
        assert_eq!(cfg.engine, EngineKind::TimeDelta);
        assert_eq!(cfg.debit_policy, DebitPolicy::OncePerDay);
        assert_eq!(cfg.fuel_capacity, 120);
        assert_eq!(cfg.initial_fuel, 100);
        assert_eq!(cfg.money_per_fuel, 12);
        assert_eq!(cfg.home_base.city, "Taipei");
        assert_eq!(cfg.target_wake.to_string(), "0800");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_json_takes_defaults() {
        assert_eq!(EconomyConfig::from_json("{}").unwrap(), EconomyConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let cfg = EconomyConfig::from_json(
            r#"{"engine":"geo","debitPolicy":"every_call","targetWake":"06:30"}"#,
        )
        .unwrap();
        assert_eq!(cfg.engine, EngineKind::Geo);
        assert_eq!(cfg.debit_policy, DebitPolicy::EveryCall);
        assert_eq!(cfg.target_wake, ClockTime::new(6, 30).unwrap());
        assert_eq!(cfg.fuel_capacity, 120);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(EconomyConfig::legacy_game()).unwrap();
        assert_eq!(json["debitPolicy"], "every_call");
        assert_eq!(json["fuelCapacity"], 1_000);
        assert_eq!(json["initialFuel"], 1_000);
        assert_eq!(json["moneyPerFuel"], 12);
        assert_eq!(json["homeBase"]["city"], "Taipei");
        assert_eq!(json["targetWake"], "0800");
        assert!(json.get("fuel_capacity").is_none());
    }

    #[test]
    fn validation_rejects_bad_tanks() {
        assert_eq!(
            EconomyConfig::from_json(r#"{"fuelCapacity":0}"#).unwrap_err(),
            ConfigError::ZeroCapacity
        );
        assert_eq!(
            EconomyConfig::from_json(r#"{"fuelCapacity":50,"initialFuel":60}"#).unwrap_err(),
            ConfigError::InitialAboveCapacity {
                initial: 60,
                capacity: 50
            }
        );
        let mut cfg = EconomyConfig::default();
        cfg.home_base.latitude = 123.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::HomeBaseOutOfRange { .. })
        ));
        assert!(matches!(
            EconomyConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn legacy_preset_is_valid() {
        let cfg = EconomyConfig::legacy_game();
        assert_eq!(cfg.fuel_capacity, 1_000);
        assert_eq!(cfg.initial_fuel, 1_000);
        assert!(cfg.validate().is_ok());
    }
}
