//! Time-delta ticket engine: jet lag proportional to wake-time drift.
//!
//! Distance grows super-linearly with the minutes between two consecutive
//! wake-ups (`10 × (Δ/5)^1.2` km, held inside `[5, 5000]`), and fuel is a
//! linear function of that distance. Deltas are measured on the clock face,
//! wrapped into `[-720, 720]`, so `23:00 → 01:00` is a two-hour hop.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::constants::{
    LON_DEGREES_PER_MINUTE, NIGHT_PENALTY_FACTOR, STREAK_BONUS_FACTOR, TIME_CLASS_BOUNDS_KM,
    TIME_DISTANCE_EXPONENT, TIME_DISTANCE_MAX_KM, TIME_DISTANCE_MIN_KM,
    TIME_DISTANCE_MINUTE_STEP, TIME_DISTANCE_SCALE_KM, TIME_FUEL_BASE, TIME_FUEL_PER_KM,
};
use crate::numbers::{clamp, round_f64_to_u32};
use crate::ticket::{Direction, TicketError, TicketOptions};

const FIRST_REGISTRATION_NARRATIVE: &str =
    "First registration at Home Base. No fuel used.";

/// Ticket classes of the time-delta engine, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeTicketClass {
    #[serde(rename = "Neighborhood Hop")]
    NeighborhoodHop,
    #[serde(rename = "City Hop")]
    CityHop,
    #[serde(rename = "Regional Flight")]
    RegionalFlight,
    #[serde(rename = "Country Flight")]
    CountryFlight,
    #[serde(rename = "Continental Edge")]
    ContinentalEdge,
    #[serde(rename = "Long-Haul")]
    LongHaul,
}

impl TimeTicketClass {
    const ASCENDING: [Self; 5] = [
        Self::NeighborhoodHop,
        Self::CityHop,
        Self::RegionalFlight,
        Self::CountryFlight,
        Self::ContinentalEdge,
    ];

    /// First class whose exclusive upper bound exceeds `distance_km`.
    #[must_use]
    pub fn for_distance(distance_km: u32) -> Self {
        Self::ASCENDING
            .into_iter()
            .zip(TIME_CLASS_BOUNDS_KM)
            .find(|(_, bound)| distance_km < *bound)
            .map_or(Self::LongHaul, |(class, _)| class)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NeighborhoodHop => "Neighborhood Hop",
            Self::CityHop => "City Hop",
            Self::RegionalFlight => "Regional Flight",
            Self::CountryFlight => "Country Flight",
            Self::ContinentalEdge => "Continental Edge",
            Self::LongHaul => "Long-Haul",
        }
    }

    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::NeighborhoodHop => "badge-neighborhood",
            Self::CityHop => "badge-city",
            Self::RegionalFlight => "badge-regional",
            Self::CountryFlight => "badge-country",
            Self::ContinentalEdge => "badge-continental",
            Self::LongHaul => "badge-longhaul",
        }
    }
}

impl std::fmt::Display for TimeTicketClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of one time-delta computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTicket {
    pub prev_time: Option<ClockTime>,
    pub curr_time: ClockTime,
    pub delta_min: u32,
    pub direction: Direction,
    pub distance_km: u32,
    pub fuel_used: u32,
    pub ticket_type: TimeTicketClass,
    pub narrative: String,
    /// Wrapped drift of the current wake time against the target wake time.
    pub phase_error_min: i32,
    pub lon_shift_deg: f64,
    /// True only when the penalty flag was set and the wake time was at night.
    pub night_penalty_applied: bool,
    pub streak_bonus_applied: bool,
}

/// Stateless calculator; `target` only feeds the informational phase error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDeltaEngine {
    pub target: ClockTime,
}

impl Default for TimeDeltaEngine {
    fn default() -> Self {
        Self {
            target: ClockTime::TARGET_WAKE,
        }
    }
}

impl TimeDeltaEngine {
    #[must_use]
    pub const fn new(target: ClockTime) -> Self {
        Self { target }
    }

    /// Compute a ticket from already-parsed wake times.
    #[must_use]
    pub fn issue(
        &self,
        prev: Option<ClockTime>,
        curr: ClockTime,
        options: TicketOptions,
    ) -> TimeTicket {
        let phase_error_min = curr.wrapped_delta_from(self.target);
        let lon_shift_deg = f64::from(phase_error_min) * LON_DEGREES_PER_MINUTE;

        if prev.is_none() && options.first_day_free {
            return TimeTicket {
                prev_time: None,
                curr_time: curr,
                delta_min: 0,
                direction: Direction::Local,
                distance_km: 0,
                fuel_used: 0,
                ticket_type: TimeTicketClass::NeighborhoodHop,
                narrative: FIRST_REGISTRATION_NARRATIVE.to_string(),
                phase_error_min,
                lon_shift_deg,
                night_penalty_applied: false,
                streak_bonus_applied: false,
            };
        }

        let diff = prev.map_or(0, |p| curr.wrapped_delta_from(p));
        let delta_min = diff.unsigned_abs();
        let direction = match diff {
            d if d < 0 => Direction::Eastbound,
            d if d > 0 => Direction::Westbound,
            _ => Direction::Local,
        };

        let distance_km = distance_for_delta(delta_min);
        let night_penalty_applied = options.night_penalty && curr.is_night();
        let fuel_used = fuel_for_distance(distance_km, night_penalty_applied, options.streak_bonus);
        let ticket_type = TimeTicketClass::for_distance(distance_km);
        let narrative = narrate(prev.is_none(), delta_min, direction, distance_km, fuel_used);

        debug!(
            "time ticket {prev:?}->{curr}: {delta_min}min {direction} {distance_km}km fuel {fuel_used}"
        );

        TimeTicket {
            prev_time: prev,
            curr_time: curr,
            delta_min,
            direction,
            distance_km,
            fuel_used,
            ticket_type,
            narrative,
            phase_error_min,
            lon_shift_deg,
            night_penalty_applied,
            streak_bonus_applied: options.streak_bonus,
        }
    }
}

/// Parse both HHMM strings and compute a ticket with the default engine.
///
/// # Errors
///
/// Returns [`TicketError::InvalidFormat`] if either time fails to parse; the
/// current time is validated even on a first flight.
pub fn make_ticket(
    prev: Option<&str>,
    curr: &str,
    options: TicketOptions,
) -> Result<TimeTicket, TicketError> {
    let prev = prev.map(str::parse::<ClockTime>).transpose()?;
    let curr = curr.parse::<ClockTime>()?;
    Ok(TimeDeltaEngine::default().issue(prev, curr, options))
}

/// `round(clamp(10 × (Δ/5)^1.2, 5, 5000))`.
#[must_use]
pub fn distance_for_delta(delta_min: u32) -> u32 {
    let raw = TIME_DISTANCE_SCALE_KM
        * (f64::from(delta_min) / TIME_DISTANCE_MINUTE_STEP).powf(TIME_DISTANCE_EXPONENT);
    round_f64_to_u32(clamp(raw, TIME_DISTANCE_MIN_KM, TIME_DISTANCE_MAX_KM))
}

/// Base cost `round(5 + 0.06 × km)`, then night penalty, then streak bonus,
/// rounding after each step.
#[must_use]
pub fn fuel_for_distance(distance_km: u32, night: bool, streak: bool) -> u32 {
    let mut fuel = round_f64_to_u32(TIME_FUEL_BASE + TIME_FUEL_PER_KM * f64::from(distance_km));
    if night {
        fuel = round_f64_to_u32(f64::from(fuel) * NIGHT_PENALTY_FACTOR);
    }
    if streak {
        fuel = round_f64_to_u32(f64::from(fuel) * STREAK_BONUS_FACTOR);
    }
    fuel
}

fn narrate(
    first_flight: bool,
    delta_min: u32,
    direction: Direction,
    distance_km: u32,
    fuel_used: u32,
) -> String {
    if first_flight {
        return format!(
            "This is your first takeoff: {distance_km} km flown, {fuel_used} fuel used."
        );
    }
    let (relative, heading) = match direction {
        Direction::Local => {
            return format!(
                "You took off at the same time as yesterday and stayed local, {fuel_used} fuel used."
            );
        }
        Direction::Eastbound => ("earlier", "eastbound"),
        Direction::Westbound => ("later", "westbound"),
    };
    let span = if delta_min == 1 {
        "1 minute".to_string()
    } else {
        format!("{delta_min} minutes")
    };
    format!(
        "You took off {span} {relative} than yesterday, flying {heading} {distance_km} km, {fuel_used} fuel used."
    )
}
