//! Decorative city pairs for time-delta flights.
//!
//! The pick depends on the caller-supplied day of month, so the same distance
//! shows a different route on different days. Nothing here feeds the economy.
use serde::{Deserialize, Serialize};

type Pool = &'static [(&'static str, &'static str)];

/// Inclusive km ranges and the city pairs drawn for each.
const CITY_TIERS: [(u32, u32, Pool); 7] = [
    (0, 60, &[
        ("Taipei", "New Taipei"),
        ("Shinjuku", "Shibuya"),
        ("Causeway Bay", "Tsim Sha Tsui"),
    ]),
    (61, 250, &[("Taipei", "Taichung"), ("Osaka", "Kyoto"), ("Seoul", "Incheon")]),
    (251, 700, &[("Taipei", "Kaohsiung"), ("Tokyo", "Nagoya"), ("Seoul", "Busan")]),
    (701, 1_500, &[("Taipei", "Shanghai"), ("Tokyo", "Seoul"), ("Hong Kong", "Taipei")]),
    (1_501, 3_500, &[("Taipei", "Tokyo"), ("Taipei", "Singapore"), ("Osaka", "Taipei")]),
    (3_501, 8_000, &[("Taipei", "Sydney"), ("Tokyo", "Bangkok"), ("Seoul", "Singapore")]),
    (8_001, 14_000, &[
        ("Taipei", "San Francisco"),
        ("Tokyo", "Los Angeles"),
        ("Seoul", "Paris"),
    ]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityPair {
    pub from_city: String,
    pub to_city: String,
}

/// Pick a city pair for `distance_km`; distances past the last tier use the
/// last tier.
#[must_use]
pub fn pick_cities(distance_km: u32, day_of_month: u32) -> CityPair {
    let (_, _, pool) = CITY_TIERS
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&distance_km))
        .unwrap_or(&CITY_TIERS[CITY_TIERS.len() - 1]);
    let seed = u64::from(day_of_month) + u64::from(distance_km);
    let idx = usize::try_from(seed % pool.len() as u64).unwrap_or(0);
    let (from, to) = pool[idx];
    CityPair {
        from_city: from.to_string(),
        to_city: to.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_and_day_rotate_the_pool() {
        // 5 km on the 15th: (15 + 5) % 3 == 2
        assert_eq!(pick_cities(5, 15).to_city, "Tsim Sha Tsui");
        // 86 km on the 1st: (1 + 86) % 3 == 0
        assert_eq!(pick_cities(86, 1).from_city, "Taipei");
        assert_eq!(pick_cities(86, 1).to_city, "Taichung");
        assert_eq!(pick_cities(86, 2).to_city, "Kyoto");
    }

    #[test]
    fn beyond_last_tier_uses_long_haul_pool() {
        let pair = pick_cities(20_000, 1);
        let long_haul = ["San Francisco", "Los Angeles", "Paris"];
        assert!(long_haul.contains(&pair.to_city.as_str()));
    }

    #[test]
    fn same_inputs_same_route() {
        assert_eq!(pick_cities(3_893, 9), pick_cities(3_893, 9));
    }
}
