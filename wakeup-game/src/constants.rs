//! Centralized balance and tuning constants for the Wake Up Airlines economy.
//!
//! These values define the deterministic math behind every ticket. Keeping
//! them together means the economy can only be re-tuned through reviewed code
//! changes rather than through external assets.

// Clock --------------------------------------------------------------------
pub(crate) const MINUTES_PER_DAY: i32 = 1_440;
pub(crate) const HALF_DAY_MINUTES: i32 = 720;
pub(crate) const NIGHT_ENDS_HOUR: u16 = 3;
pub(crate) const NIGHT_STARTS_HOUR: u16 = 12;
pub(crate) const DEFAULT_TARGET_WAKE_MINUTES: u16 = 8 * 60;
pub(crate) const LON_DEGREES_PER_MINUTE: f64 = 0.25;

// Time-delta engine --------------------------------------------------------
pub(crate) const TIME_DISTANCE_SCALE_KM: f64 = 10.0;
pub(crate) const TIME_DISTANCE_MINUTE_STEP: f64 = 5.0;
pub(crate) const TIME_DISTANCE_EXPONENT: f64 = 1.2;
pub(crate) const TIME_DISTANCE_MIN_KM: f64 = 5.0;
pub(crate) const TIME_DISTANCE_MAX_KM: f64 = 5_000.0;
pub(crate) const TIME_FUEL_BASE: f64 = 5.0;
pub(crate) const TIME_FUEL_PER_KM: f64 = 0.06;
pub(crate) const NIGHT_PENALTY_FACTOR: f64 = 1.2;
pub(crate) const STREAK_BONUS_FACTOR: f64 = 0.9;

/// Exclusive upper bounds (km) for the time-delta ticket classes.
pub(crate) const TIME_CLASS_BOUNDS_KM: [u32; 5] = [20, 150, 350, 800, 2_000];

// Geo-distance engine ------------------------------------------------------
pub(crate) const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Inclusive upper bounds (km) and the fuel each band costs.
pub(crate) const GEO_FUEL_BANDS: [(u32, u32); 3] = [(1_000, 10), (3_000, 30), (7_000, 70)];
pub(crate) const GEO_FUEL_LONG_HAUL: u32 = 100;

/// Inclusive upper bounds (km) for the geo ticket classes after "First Flight".
pub(crate) const GEO_CLASS_BOUNDS_KM: [u32; 4] = [500, 1_500, 3_000, 7_000];

pub(crate) const HOME_BASE_CITY: &str = "Taipei";
pub(crate) const HOME_BASE_COUNTRY: &str = "Taiwan";
pub(crate) const HOME_BASE_LATITUDE: f64 = 25.0330;
pub(crate) const HOME_BASE_LONGITUDE: f64 = 121.5654;

// Fuel tank ----------------------------------------------------------------
pub(crate) const DEFAULT_FUEL_CAPACITY: u32 = 120;
pub(crate) const DEFAULT_INITIAL_FUEL: u32 = 100;
pub(crate) const LEGACY_FUEL_CAPACITY: u32 = 1_000;
pub(crate) const DEFAULT_MONEY_PER_FUEL: u32 = 12;

// Persistence keys ---------------------------------------------------------
pub const KEY_FUEL: &str = "WUM_FUEL";
pub const KEY_LAST_EVENT: &str = "WUM_LAST_EVENT";
pub const KEY_LAST_DATE: &str = "WUM_LAST_DATE";
pub const KEY_TICKETS: &str = "WUM_TICKETS";
pub const KEY_CURRENT_TICKET: &str = "WUM_CURRENT_TICKET";
