use wakeup_game::geo::fuel_band;
use wakeup_game::time_delta::{distance_for_delta, fuel_for_distance};
use wakeup_game::{
    ClockTime, Direction, GeoTicketClass, Location, TicketError, TicketOptions, TimeDeltaEngine,
    TimeTicketClass, haversine_km, make_geo_ticket, make_ticket,
};

fn all_times() -> impl Iterator<Item = ClockTime> {
    (0..1440_u16).filter_map(ClockTime::from_minutes)
}

#[test]
fn every_clock_pair_stays_in_bounds() {
    let engine = TimeDeltaEngine::default();
    let anchors = ["0000", "0300", "0830", "1200", "2359"];
    for anchor in anchors {
        let prev: ClockTime = anchor.parse().unwrap();
        for curr in all_times() {
            let t = engine.issue(Some(prev), curr, TicketOptions::default());
            assert!(t.delta_min <= 720, "{anchor}->{curr}");
            assert!((5..=5000).contains(&t.distance_km), "{anchor}->{curr}");
            assert!(t.fuel_used >= 5);
            assert_eq!(t.direction == Direction::Local, t.delta_min == 0);
            assert_eq!(t.ticket_type, TimeTicketClass::for_distance(t.distance_km));
            assert!((-720..=720).contains(&t.phase_error_min));
        }
    }
}

#[test]
fn distance_fuel_and_class_never_decrease_with_delta() {
    let mut last = (0, 0, TimeTicketClass::NeighborhoodHop);
    for delta in 0..=720 {
        let km = distance_for_delta(delta);
        let fuel = fuel_for_distance(km, false, false);
        let class = TimeTicketClass::for_distance(km);
        assert!(km >= last.0, "distance dipped at {delta}");
        assert!(fuel >= last.1, "fuel dipped at {delta}");
        assert!(class >= last.2, "class dipped at {delta}");
        last = (km, fuel, class);
    }
    assert_eq!(last.2, TimeTicketClass::LongHaul);
}

#[test]
fn modifiers_only_touch_fuel() {
    for curr in all_times().step_by(7) {
        let prev = ClockTime::from_minutes(curr.minutes() / 2);
        let plain = TimeDeltaEngine::default().issue(prev, curr, TicketOptions::default());
        let tuned = TimeDeltaEngine::default().issue(
            prev,
            curr,
            TicketOptions::default()
                .with_night_penalty(true)
                .with_streak_bonus(true),
        );
        assert_eq!(plain.distance_km, tuned.distance_km);
        assert_eq!(plain.direction, tuned.direction);
        assert_eq!(tuned.night_penalty_applied, curr.is_night());
        assert_eq!(
            tuned.fuel_used,
            fuel_for_distance(plain.distance_km, curr.is_night(), true)
        );
    }
}

#[test]
fn string_api_matches_reference_scenarios() {
    let t = make_ticket(Some("08:30"), "0900", TicketOptions::default()).unwrap();
    assert_eq!((t.delta_min, t.distance_km, t.fuel_used), (30, 86, 10));
    assert_eq!(t.direction, Direction::Westbound);

    let wrapped = make_ticket(Some("2300"), "0100", TicketOptions::default()).unwrap();
    assert_eq!(wrapped.delta_min, 120);
    assert_eq!(wrapped.direction, Direction::Westbound);

    for bad in ["830", "2400", "0860", "ab:cd", ""] {
        let err = make_ticket(Some("0800"), bad, TicketOptions::default()).unwrap_err();
        assert!(matches!(err, TicketError::InvalidFormat { .. }), "{bad}");
    }
}

#[test]
fn geo_distances_band_and_classify_consistently() {
    let cities = [
        Location::new("Tokyo", "Japan", 35.6762, 139.6503),
        Location::new("Bangkok", "Thailand", 13.7563, 100.5018),
        Location::new("Paris", "France", 48.8566, 2.3522),
        Location::new("New York", "United States", 40.7128, -74.0060),
        Location::new("Sydney", "Australia", -33.8688, 151.2093),
    ];
    for from in &cities {
        for to in &cities {
            let t = make_geo_ticket(Some(from), Some(to), TicketOptions::default()).unwrap();
            let raw = haversine_km(from, to);
            assert_eq!(t.fuel_used, fuel_band(raw));
            assert_eq!(t.money, t.fuel_used * 12);
            assert_eq!(t.ticket_type, GeoTicketClass::for_distance(raw));
            let back = make_geo_ticket(Some(to), Some(from), TicketOptions::default()).unwrap();
            assert_eq!(t.distance_km, back.distance_km);
        }
    }
    assert_eq!(
        make_geo_ticket(None, None, TicketOptions::default()).unwrap_err(),
        TicketError::MissingLocation
    );
}
