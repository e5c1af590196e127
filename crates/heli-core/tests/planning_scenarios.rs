//! End-to-end planning scenarios.
//!
//! Drives `recompute` and `OverrideEngine` through whole routes and checks
//! the fuel and capacity properties pilots rely on.

use heli_core::spatial::{EARTH_RADIUS_M, METERS_PER_NM};
use heli_core::{
    recompute, AircraftProfile, FuelPolicy, OverrideEngine, OverrideField, OverrideStore,
    PlanOutcome, PlanningError, PlanningInput, ReserveMethod, RouteWaypoint, StopKey,
    WeatherInput,
};

fn aircraft() -> AircraftProfile {
    AircraftProfile {
        name: "S-92".to_string(),
        cruise_speed_kt: 140.0,
        fuel_burn_per_hour: 1100.0,
        max_usable_fuel: 5000.0,
        max_takeoff_weight: 26_500.0,
        empty_weight: 17_000.0,
        max_structural_payload: 7_500.0,
        passenger_seat_limit: 19,
    }
}

fn policy() -> FuelPolicy {
    FuelPolicy {
        reserve: ReserveMethod::Fixed { amount: 600.0 },
        contingency_fraction: 0.10,
        taxi_fuel: 50.0,
        deck_fuel_per_hour: 400.0,
        default_deck_minutes: 5.0,
        passenger_unit_weight: 220.0,
    }
}

/// Latitude `nm` nautical miles north of the equator.
fn lat_for_nm(nm: f64) -> f64 {
    (nm * METERS_PER_NM / EARTH_RADIUS_M).to_degrees()
}

fn gulf_route() -> Vec<RouteWaypoint> {
    vec![
        RouteWaypoint::new("KHUM", 29.56, -90.66),
        RouteWaypoint::new("ST200", 28.9, -90.8),
        RouteWaypoint::new("GC123", 28.2, -90.9),
        RouteWaypoint::new("GC456", 27.8, -91.1),
        RouteWaypoint::new("EW910", 28.6, -91.9),
        RouteWaypoint::new("KLCH", 30.12, -93.22),
    ]
}

fn plan(input: &PlanningInput) -> heli_core::FlightPlanResult {
    match recompute(input).unwrap() {
        PlanOutcome::Planned(plan) => plan,
        other => panic!("expected a plan, got {other:?}"),
    }
}

fn gulf_input() -> PlanningInput {
    PlanningInput::new(gulf_route())
        .with_aircraft(aircraft())
        .with_policy(policy())
        .with_weather(WeatherInput {
            ara_fuel: 150.0,
            approach_fuel: 100.0,
            ..WeatherInput::calm().with_wind(250.0, 18.0)
        })
}

/// 100 nm at 140 kt burning 1100/h.
#[test]
fn test_single_leg_time_and_burn() {
    let input = PlanningInput::new(vec![
        RouteWaypoint::new("KAAA", 0.0, 0.0),
        RouteWaypoint::new("KBBB", lat_for_nm(100.0), 0.0),
    ])
    .with_aircraft(aircraft())
    .with_policy(policy());
    let plan = plan(&input);

    let leg = &plan.legs[0];
    assert!((leg.flight_time_hours - 0.714).abs() < 0.001);
    assert!((leg.fuel_burned - 786.0).abs() < 1.0);
}

/// Two-stop route: departure carries taxi, trip plus contingency, reserve.
#[test]
fn test_two_stop_required_fuel() {
    let input = PlanningInput::new(vec![
        RouteWaypoint::new("KHUM", 29.56, -90.66),
        RouteWaypoint::new("GC123", 28.2, -90.9),
    ])
    .with_aircraft(aircraft())
    .with_policy(policy());
    let plan = plan(&input);

    let expected = 50.0 + plan.legs[0].fuel_burned * 1.10 + 600.0;
    assert!((plan.stops[0].required_fuel - expected).abs() < 1e-9);
    assert_eq!(plan.stops[1].required_fuel, 600.0);
}

/// Middle refuel stop splits the route into independent segments.
#[test]
fn test_refuel_stop_splits_route() {
    let mut waypoints = vec![
        RouteWaypoint::new("KHUM", 29.56, -90.66),
        RouteWaypoint::new("GC123", 28.2, -90.9).with_refuel(),
        RouteWaypoint::new("KLCH", 30.12, -93.22),
    ];
    let input = PlanningInput::new(waypoints.clone())
        .with_aircraft(aircraft())
        .with_policy(policy());
    let before = plan(&input);

    let first_leg = before.legs[0].fuel_burned;
    let second_leg = before.legs[1].fuel_burned;
    assert!((before.stops[0].required_fuel - (50.0 + first_leg * 1.10 + 600.0)).abs() < 1e-9);
    assert!((before.stops[1].required_fuel - (second_leg * 1.10 + 600.0)).abs() < 1e-9);

    // Moving the departure changes the first leg only.
    waypoints[0] = RouteWaypoint::new("KHOU", 29.65, -95.28);
    let mut moved = input.clone();
    moved.waypoints = waypoints;
    let after = plan(&moved);
    assert_ne!(after.legs[0].fuel_burned, first_leg);
    assert_eq!(after.stops[1].required_fuel, before.stops[1].required_fuel);
}

/// Requested weight over the structural budget fails capacity but leaves
/// fuel alone.
#[test]
fn test_requested_weight_over_budget() {
    let input = gulf_input();
    let baseline = plan(&input);
    let target = &baseline.stops[2];
    let budget = aircraft().max_structural_payload - target.required_fuel;

    let mut engine = OverrideEngine::new(input).unwrap();
    let outcome = engine
        .apply_override(&target.key, OverrideField::RequestedWeight, budget + 100.0)
        .unwrap();
    let edited = outcome.plan().unwrap();

    assert!(!edited.stops[2].is_capacity_ok);
    assert!(!edited.summary.all_capacity_ok);
    assert_eq!(edited.summary.stops_over_capacity, 1);
    for (a, b) in baseline.stops.iter().zip(&edited.stops) {
        assert_eq!(a.required_fuel, b.required_fuel);
        assert_eq!(a.fuel_components, b.fuel_components);
    }
}

#[test]
fn test_required_fuel_non_increasing_without_refuel() {
    let plan = plan(&gulf_input());
    for pair in plan.stops.windows(2) {
        assert!(
            pair[0].required_fuel >= pair[1].required_fuel,
            "{} needs {} but {} needs {}",
            pair[0].key,
            pair[0].required_fuel,
            pair[1].key,
            pair[1].required_fuel
        );
    }
}

/// Removing stops before a refuel stop never changes that stop or later ones.
#[test]
fn test_refuel_stop_independent_of_earlier_stops() {
    let mut route = gulf_route();
    route[3].is_refuel = true;
    let mut input = gulf_input();
    input.waypoints = route.clone();
    let full = plan(&input);

    route.remove(2);
    route.remove(1);
    input.waypoints = route;
    let trimmed = plan(&input);

    let tail_full = &full.stops[3..];
    let tail_trimmed = &trimmed.stops[1..];
    assert_eq!(tail_full.len(), tail_trimmed.len());
    for (a, b) in tail_full.iter().zip(tail_trimmed) {
        assert_eq!(a.key, b.key);
        assert_eq!(a.required_fuel, b.required_fuel);
        assert_eq!(a.fuel_components, b.fuel_components);
    }
}

/// Resetting an override restores the exact pre-override outcome.
#[test]
fn test_apply_then_reset_is_identity() {
    let mut engine = OverrideEngine::new(gulf_input()).unwrap();
    let baseline = engine.outcome().clone();
    let keys = engine.stop_keys().unwrap();

    let cases = [
        (&keys[0], OverrideField::ExtraFuel, 250.0),
        (&keys[2], OverrideField::AraFuel, 400.0),
        (&keys[3], OverrideField::DeckTimeMinutes, 45.0),
        (&keys[4], OverrideField::RequestedPassengers, 12.0),
        (&keys[5], OverrideField::ApproachFuel, 0.0),
    ];
    for (key, field, value) in cases {
        let edited = engine.apply_override(key, field, value).unwrap().clone();
        assert_ne!(edited, baseline, "{field} on {key} had no effect");
        let restored = engine.reset_override(key, field).unwrap();
        assert_eq!(*restored, baseline, "{field} on {key} not restored");
    }
    assert!(engine.overrides().is_empty());
}

/// Saved overrides re-applied to the same inputs reproduce the same output.
#[test]
fn test_saved_overrides_reproduce_output() {
    let mut engine = OverrideEngine::new(gulf_input()).unwrap();
    let keys = engine.stop_keys().unwrap();
    engine
        .apply_override(&keys[0], OverrideField::ExtraFuel, 200.0)
        .unwrap();
    engine
        .apply_override(&keys[2], OverrideField::RequestedPassengers, 8.0)
        .unwrap();
    let saved_results = serde_json::to_string(engine.outcome()).unwrap();
    let saved_overrides = serde_json::to_string(engine.overrides()).unwrap();

    let reloaded: OverrideStore = serde_json::from_str(&saved_overrides).unwrap();
    let outcome = recompute(&gulf_input().with_overrides(reloaded)).unwrap();
    assert_eq!(&outcome, engine.outcome());
    assert_eq!(serde_json::to_string(&outcome).unwrap(), saved_results);

    let parsed: serde_json::Value = serde_json::from_str(&saved_results).unwrap();
    assert_eq!(parsed["status"], "planned");
    assert_eq!(parsed["stops"][0]["overrides"]["extra_fuel"], 200.0);
}

/// Zero contingency: departure = taxi + first leg + reserve.
#[test]
fn test_zero_contingency_boundary() {
    let input = PlanningInput::new(vec![
        RouteWaypoint::new("KHUM", 29.56, -90.66),
        RouteWaypoint::new("KLCH", 30.12, -93.22),
    ])
    .with_aircraft(aircraft())
    .with_policy(FuelPolicy {
        contingency_fraction: 0.0,
        ..policy()
    });
    let plan = plan(&input);
    let expected = 50.0 + plan.legs[0].fuel_burned + 600.0;
    assert!((plan.stops[0].required_fuel - expected).abs() < 1e-9);
}

#[test]
fn test_missing_aircraft_is_placeholder() {
    let mut input = gulf_input();
    input.aircraft = None;
    let mut engine = OverrideEngine::new(input).unwrap();
    assert!(!engine.outcome().is_planned());

    let outcome = engine.set_aircraft(Some(aircraft())).unwrap();
    assert!(outcome.is_planned());
}

#[test]
fn test_unknown_stop_is_rejected() {
    let mut engine = OverrideEngine::new(gulf_input()).unwrap();
    let key = StopKey::from("NOWHERE@0.00000,0.00000");
    let err = engine
        .apply_override(&key, OverrideField::ExtraFuel, 100.0)
        .unwrap_err();
    assert_eq!(
        err,
        PlanningError::UnknownStop {
            key: key.to_string()
        }
    );
    assert!(engine.overrides().is_empty());
}

#[test]
fn test_invalid_override_keeps_previous_state() {
    let mut engine = OverrideEngine::new(gulf_input()).unwrap();
    let keys = engine.stop_keys().unwrap();
    let before = engine.outcome().clone();
    let err = engine
        .apply_override(&keys[1], OverrideField::RequestedPassengers, 2.5)
        .unwrap_err();
    assert!(matches!(err, PlanningError::InvalidOverride { .. }));
    assert_eq!(*engine.outcome(), before);
}

/// Overrides follow the stop, not its position in the list.
#[test]
fn test_overrides_survive_route_edits() {
    let mut engine = OverrideEngine::new(gulf_input()).unwrap();
    let keys = engine.stop_keys().unwrap();
    let gc456 = keys[3].clone();
    engine
        .apply_override(&gc456, OverrideField::AraFuel, 500.0)
        .unwrap();

    // Insert a new stop ahead of it.
    let mut route = gulf_route();
    route.insert(1, RouteWaypoint::new("SS300", 29.2, -90.7));
    let outcome = engine.set_waypoints(route.clone()).unwrap();
    let plan = outcome.plan().unwrap();
    assert_eq!(plan.stops[4].key, gc456);
    assert_eq!(plan.stops[4].overrides.ara_fuel, Some(500.0));
    assert_eq!(plan.stops[4].arrival_approach_fuel, 500.0);
    assert_eq!(plan.stops[1].overrides.ara_fuel, None);

    // Drop it: the override is kept aside and comes back with the stop.
    route.remove(4);
    engine.set_waypoints(route).unwrap();
    assert_eq!(engine.orphaned_overrides(), vec![gc456.clone()]);

    engine.set_waypoints(gulf_route()).unwrap();
    assert!(engine.orphaned_overrides().is_empty());
    let plan = engine.outcome().plan().unwrap();
    assert_eq!(plan.stops[3].overrides.ara_fuel, Some(500.0));
}

fn revisit_route() -> Vec<RouteWaypoint> {
    vec![
        RouteWaypoint::new("KHUM", 29.56, -90.66),
        RouteWaypoint::new("GC123", 28.2, -90.9),
        RouteWaypoint::new("ST200", 28.9, -90.8),
        RouteWaypoint::new("GC123", 28.2, -90.9),
        RouteWaypoint::new("KLCH", 30.12, -93.22),
    ]
}

/// Test that removing the first visit of a revisited site does not hand its
/// override to the later visit that inherits the bare key.
#[test]
fn test_removed_visit_keeps_its_override() {
    let mut engine =
        OverrideEngine::new(gulf_input().with_waypoints(revisit_route())).unwrap();
    let keys = engine.stop_keys().unwrap();
    let first_gc123 = keys[1].clone();
    assert_eq!(keys[3].as_str(), format!("{}#2", first_gc123));
    engine
        .apply_override(&first_gc123, OverrideField::RequestedWeight, 9000.0)
        .unwrap();
    assert!(!engine.outcome().plan().unwrap().stops[1].is_capacity_ok);

    let mut route = revisit_route();
    route.remove(1);
    let outcome = engine.set_waypoints(route).unwrap();
    let plan = outcome.plan().unwrap();

    assert_eq!(plan.stops[2].key, first_gc123);
    assert_eq!(plan.stops[2].overrides.requested_weight, None);
    assert!(plan.stops[2].is_capacity_ok);
    assert!(plan.stops.iter().all(|s| s.overrides.is_empty()));
    assert_eq!(engine.orphaned_overrides(), vec![first_gc123.clone()]);
    assert_eq!(
        engine.detached_overrides()[0].1.requested_weight,
        Some(9000.0)
    );
}

/// Test that an override on a later visit follows it when its `#n` key shifts.
#[test]
fn test_override_follows_shifted_visit() {
    let mut engine =
        OverrideEngine::new(gulf_input().with_waypoints(revisit_route())).unwrap();
    let second_gc123 = engine.stop_keys().unwrap()[3].clone();
    engine
        .apply_override(&second_gc123, OverrideField::DeckTimeMinutes, 30.0)
        .unwrap();

    let mut route = revisit_route();
    route.remove(1);
    engine.set_waypoints(route).unwrap();
    let plan = engine.outcome().plan().unwrap();

    assert_ne!(plan.stops[2].key, second_gc123);
    assert_eq!(plan.stops[2].overrides.deck_time_minutes, Some(30.0));
    assert_eq!(plan.stops[2].deck_time_minutes, 30.0);
    assert!(engine.orphaned_overrides().is_empty());
}

/// Test that visit ids give repeat visits keys that do not depend on order.
#[test]
fn test_visit_ids_pin_override_keys() {
    let mut route = revisit_route();
    route[1] = route[1].clone().with_id("am");
    route[3] = route[3].clone().with_id("pm");
    let mut engine = OverrideEngine::new(gulf_input().with_waypoints(route.clone())).unwrap();
    let pm = engine.stop_keys().unwrap()[3].clone();
    assert!(pm.as_str().ends_with("/pm"));
    engine
        .apply_override(&pm, OverrideField::RequestedPassengers, 4.0)
        .unwrap();

    route.remove(1);
    engine.set_waypoints(route).unwrap();
    let plan = engine.outcome().plan().unwrap();
    assert_eq!(plan.stops[2].key, pm);
    assert_eq!(plan.stops[2].overrides.requested_passengers, Some(4));
}

/// Test that applying the same override value twice changes nothing the
/// second time.
#[test]
fn test_applying_same_override_twice_is_stable() {
    let mut engine = OverrideEngine::new(gulf_input()).unwrap();
    let key = engine.stop_keys().unwrap()[2].clone();

    let once = engine
        .apply_override(&key, OverrideField::ExtraFuel, 250.0)
        .unwrap()
        .clone();
    let twice = engine
        .apply_override(&key, OverrideField::ExtraFuel, 250.0)
        .unwrap()
        .clone();
    assert_eq!(once, twice);

    let once = engine
        .apply_override(&key, OverrideField::RequestedPassengers, 6.0)
        .unwrap()
        .clone();
    let twice = engine
        .apply_override(&key, OverrideField::RequestedPassengers, 6.0)
        .unwrap()
        .clone();
    assert_eq!(once, twice);
    assert_eq!(engine.overrides().len(), 1);
}

/// Test that negative policy and cargo figures are refused, not planned.
#[test]
fn test_negative_inputs_are_rejected() {
    let input = gulf_input().with_policy(FuelPolicy {
        taxi_fuel: -2000.0,
        ..policy()
    });
    assert!(matches!(
        recompute(&input),
        Err(PlanningError::InvalidPolicy { .. })
    ));

    let mut route = gulf_route();
    route[2] = route[2].clone().with_cargo(-5000.0);
    let input = gulf_input().with_waypoints(route);
    assert!(matches!(
        recompute(&input),
        Err(PlanningError::InvalidWaypoint { index: 2, .. })
    ));

    let mut engine = OverrideEngine::new(gulf_input()).unwrap();
    let before = engine.outcome().clone();
    assert!(engine
        .set_weather(WeatherInput {
            ara_fuel: -150.0,
            ..WeatherInput::calm()
        })
        .is_err());
    assert_eq!(engine.outcome(), &before);
}

/// Time-based reserve scales with the aircraft's burn rate.
#[test]
fn test_time_based_reserve() {
    let input = gulf_input().with_policy(FuelPolicy {
        reserve: ReserveMethod::TimeBased { minutes: 30.0 },
        ..policy()
    });
    let plan = plan(&input);
    let last = plan.stops.last().unwrap();
    assert!((last.required_fuel - 550.0).abs() < 1e-9);
    for stop in &plan.stops {
        assert!((stop.fuel_components.reserve - 550.0).abs() < 1e-9);
    }
}
