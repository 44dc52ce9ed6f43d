//! Geo-distance ticket engine: physical great-circle distance between cities.
//!
//! Unlike the time-delta engine this one uses discrete fuel bands and its own
//! class taxonomy; the two are not numerically compatible.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MONEY_PER_FUEL, EARTH_RADIUS_KM, GEO_CLASS_BOUNDS_KM, GEO_FUEL_BANDS,
    GEO_FUEL_LONG_HAUL, HOME_BASE_CITY, HOME_BASE_COUNTRY, HOME_BASE_LATITUDE,
    HOME_BASE_LONGITUDE, STREAK_BONUS_FACTOR,
};
use crate::numbers::{floor_f64_to_u32, round_f64_to_u32};
use crate::ticket::{Direction, TicketError, TicketOptions};

/// A named point on the globe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    #[must_use]
    pub fn new(city: &str, country: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            city: city.to_string(),
            country: country.to_string(),
            latitude,
            longitude,
        }
    }

    /// Implicit origin when there is no previous wake location.
    #[must_use]
    pub fn home_base() -> Self {
        Self::new(
            HOME_BASE_CITY,
            HOME_BASE_COUNTRY,
            HOME_BASE_LATITUDE,
            HOME_BASE_LONGITUDE,
        )
    }

    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Great-circle distance in kilometres on a 6371 km sphere.
#[must_use]
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Ticket classes of the geo engine, shortest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeoTicketClass {
    #[serde(rename = "First Flight")]
    FirstFlight,
    #[serde(rename = "Local Flight")]
    LocalFlight,
    #[serde(rename = "Regional Flight")]
    RegionalFlight,
    #[serde(rename = "Country Flight")]
    CountryFlight,
    #[serde(rename = "Continental Flight")]
    ContinentalFlight,
    #[serde(rename = "Intercontinental Flight")]
    IntercontinentalFlight,
}

impl GeoTicketClass {
    const BANDED: [Self; 4] = [
        Self::LocalFlight,
        Self::RegionalFlight,
        Self::CountryFlight,
        Self::ContinentalFlight,
    ];

    /// Classify an unrounded great-circle distance.
    #[must_use]
    pub fn for_distance(distance_km: f64) -> Self {
        if distance_km <= 0.0 {
            return Self::FirstFlight;
        }
        Self::BANDED
            .into_iter()
            .zip(GEO_CLASS_BOUNDS_KM)
            .find(|(_, bound)| distance_km <= f64::from(*bound))
            .map_or(Self::IntercontinentalFlight, |(class, _)| class)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstFlight => "First Flight",
            Self::LocalFlight => "Local Flight",
            Self::RegionalFlight => "Regional Flight",
            Self::CountryFlight => "Country Flight",
            Self::ContinentalFlight => "Continental Flight",
            Self::IntercontinentalFlight => "Intercontinental Flight",
        }
    }

    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::FirstFlight => "badge-first",
            Self::LocalFlight => "badge-local",
            Self::RegionalFlight => "badge-regional",
            Self::CountryFlight => "badge-country",
            Self::ContinentalFlight => "badge-continental",
            Self::IntercontinentalFlight => "badge-intercontinental",
        }
    }
}

impl std::fmt::Display for GeoTicketClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of one geo computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoTicket {
    pub from_city: String,
    pub from_country: String,
    pub to_city: String,
    pub to_country: String,
    pub distance_km: u32,
    pub direction: Direction,
    pub fuel_used: u32,
    /// `fuel_used × money_per_fuel`; display only.
    pub money: u32,
    pub ticket_type: GeoTicketClass,
    pub narrative: String,
    pub streak_bonus_applied: bool,
}

/// Banded fuel on the unrounded distance: ≤1000 → 10, ≤3000 → 30,
/// ≤7000 → 70, else 100.
#[must_use]
pub fn fuel_band(distance_km: f64) -> u32 {
    GEO_FUEL_BANDS
        .iter()
        .find(|(bound, _)| distance_km <= f64::from(*bound))
        .map_or(GEO_FUEL_LONG_HAUL, |(_, fuel)| *fuel)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoEngine {
    pub home_base: Location,
    pub money_per_fuel: u32,
}

impl Default for GeoEngine {
    fn default() -> Self {
        Self {
            home_base: Location::home_base(),
            money_per_fuel: DEFAULT_MONEY_PER_FUEL,
        }
    }
}

impl GeoEngine {
    #[must_use]
    pub const fn new(home_base: Location, money_per_fuel: u32) -> Self {
        Self {
            home_base,
            money_per_fuel,
        }
    }

    /// Compute a geo ticket. `prev` is optional; without it the flight leaves
    /// from the home base.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::MissingLocation`] when `curr` is absent.
    pub fn issue(
        &self,
        prev: Option<&Location>,
        curr: Option<&Location>,
        options: TicketOptions,
    ) -> Result<GeoTicket, TicketError> {
        let curr = curr.ok_or(TicketError::MissingLocation)?;
        if options.night_penalty {
            debug!("geo tickets carry no night penalty; flag ignored");
        }

        let origin = prev.unwrap_or(&self.home_base);
        let raw_km = haversine_km(origin, curr);
        let distance_km = round_f64_to_u32(raw_km);
        let direction = match prev {
            None => Direction::Local,
            Some(p) if curr.longitude > p.longitude => Direction::Eastbound,
            Some(_) => Direction::Westbound,
        };

        let mut fuel_used = if options.first_day_free {
            0
        } else {
            fuel_band(raw_km)
        };
        if options.streak_bonus {
            fuel_used = floor_f64_to_u32(f64::from(fuel_used) * STREAK_BONUS_FACTOR);
        }
        let money = fuel_used.saturating_mul(self.money_per_fuel);
        let ticket_type = GeoTicketClass::for_distance(raw_km);

        let narrative = match prev {
            None => format!(
                "First departure from Home Base {}, {} to {}, {}: {distance_km} km, {fuel_used} fuel (NT${money}).",
                origin.city, origin.country, curr.city, curr.country
            ),
            Some(_) => format!(
                "Flying {} from {}, {} to {}, {}: {distance_km} km, {fuel_used} fuel (NT${money}).",
                direction.as_str().to_lowercase(),
                origin.city,
                origin.country,
                curr.city,
                curr.country
            ),
        };

        debug!(
            "geo ticket {}->{}: {distance_km}km {direction} fuel {fuel_used}",
            origin.city, curr.city
        );

        Ok(GeoTicket {
            from_city: origin.city.clone(),
            from_country: origin.country.clone(),
            to_city: curr.city.clone(),
            to_country: curr.country.clone(),
            distance_km,
            direction,
            fuel_used,
            money,
            ticket_type,
            narrative,
            streak_bonus_applied: options.streak_bonus,
        })
    }
}

/// Geo ticket with the default home base and money rate.
///
/// # Errors
///
/// Returns [`TicketError::MissingLocation`] when `curr` is absent.
pub fn make_geo_ticket(
    prev: Option<&Location>,
    curr: Option<&Location>,
    options: TicketOptions,
) -> Result<GeoTicket, TicketError> {
    GeoEngine::default().issue(prev, curr, options)
}
