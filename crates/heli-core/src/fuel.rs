//! Minimum fuel required to depart each stop.
//!
//! Fuel need flows backward from the destination: a stop must carry fuel for
//! every leg, deck turn and approach up to the next place fuel can be loaded.
//! The solver walks the stops in reverse with an explicit accumulator that
//! resets at refuel stops, so a refuel stop's requirement never depends on
//! anything flown before it.
//!
//! The solver never rejects input. A requirement larger than the aircraft's
//! tanks is still reported; capacity evaluation flags it.

use crate::legs::Leg;
use crate::models::{AircraftProfile, FuelPolicy, WeatherInput};
use crate::stops::{SiteKind, Stop};
use serde::{Deserialize, Serialize};

/// Named breakdown of a stop's required fuel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelComponents {
    pub taxi: f64,
    pub trip: f64,
    pub contingency: f64,
    pub deck: f64,
    pub reserve: f64,
    /// Airborne radar approaches into rigs
    pub ara: f64,
    /// Instrument approaches into airports
    pub approach: f64,
    pub extra: f64,
}

impl FuelComponents {
    pub fn total(&self) -> f64 {
        self.taxi
            + self.trip
            + self.contingency
            + self.deck
            + self.reserve
            + self.ara
            + self.approach
            + self.extra
    }
}

/// Solver output for one stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StopFuel {
    pub required_fuel: f64,
    pub components: FuelComponents,
    /// ARA plus approach fuel for flying into this stop
    pub arrival_approach_fuel: f64,
}

/// Running need from the current stop to the next refuel point or the
/// destination.
#[derive(Debug, Clone, Copy, Default)]
struct SegmentAccumulator {
    trip: f64,
    deck: f64,
    ara: f64,
    approach: f64,
}

impl SegmentAccumulator {
    fn add_leg(&mut self, leg: &Leg) {
        self.trip += leg.fuel_burned;
    }

    fn add_arrival(&mut self, (ara, approach): (f64, f64)) {
        self.ara += ara;
        self.approach += approach;
    }

    fn add_deck(&mut self, fuel: f64) {
        self.deck += fuel;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// ARA and approach additions for flying into `stop`, as (ara, approach).
///
/// Weather defaults follow the site: rigs get ARA fuel, airports approach
/// fuel. An explicit override is honored on any stop, so a rig with an
/// instrument approach can carry both.
pub fn arrival_additions(stop: &Stop, weather: &WeatherInput) -> (f64, f64) {
    if stop.is_departure() {
        return (0.0, 0.0);
    }
    let (ara_default, approach_default) = match stop.site {
        SiteKind::Rig => (weather.ara_fuel, 0.0),
        SiteKind::Airport => (0.0, weather.approach_fuel),
    };
    (
        stop.overrides.ara_fuel.unwrap_or(ara_default),
        stop.overrides.approach_fuel.unwrap_or(approach_default),
    )
}

/// Fuel burned while turning on deck at `stop`.
pub fn deck_fuel(stop: &Stop, policy: &FuelPolicy) -> f64 {
    policy.deck_fuel_per_hour * stop.deck_time_minutes / 60.0
}

fn is_boundary(stop: &Stop) -> bool {
    stop.is_refuel || stop.is_destination()
}

/// Solve required fuel for every stop.
///
/// `legs[i]` must connect `stops[i]` to `stops[i + 1]`.
pub fn solve_required_fuel(
    stops: &[Stop],
    legs: &[Leg],
    aircraft: &AircraftProfile,
    policy: &FuelPolicy,
    weather: &WeatherInput,
) -> Vec<StopFuel> {
    let n = stops.len();
    let mut results = vec![StopFuel::default(); n];
    if n == 0 {
        return results;
    }

    let reserve = policy.reserve.fuel(aircraft.fuel_burn_per_hour);

    for (idx, stop) in stops.iter().enumerate() {
        let (ara, approach) = arrival_additions(stop, weather);
        results[idx].arrival_approach_fuel = ara + approach;
    }

    // Destination: only the reserve has to be aboard on landing.
    let last = n - 1;
    results[last].components.reserve = reserve;
    results[last].required_fuel = reserve;

    let mut acc = SegmentAccumulator::default();
    for idx in (0..last).rev() {
        let next = &stops[idx + 1];
        if !is_boundary(next) {
            acc.add_deck(deck_fuel(next, policy));
        }
        if let Some(leg) = legs.get(idx) {
            acc.add_leg(leg);
        }
        acc.add_arrival(arrival_additions(next, weather));

        results[idx].components = FuelComponents {
            taxi: if idx == 0 { policy.taxi_fuel } else { 0.0 },
            trip: acc.trip,
            contingency: acc.trip * policy.contingency_fraction,
            deck: acc.deck,
            reserve,
            ara: acc.ara,
            approach: acc.approach,
            extra: 0.0,
        };

        if stops[idx].is_refuel {
            acc.reset();
        }
    }

    // Extra fuel is loaded at a departure or refuel stop and stays aboard
    // until the next one.
    let mut carried_extra = 0.0;
    for idx in 0..last {
        let stop = &stops[idx];
        if stop.is_loading_point() {
            carried_extra = stop.overrides.extra_fuel.unwrap_or(0.0);
        }
        results[idx].components.extra = carried_extra;
        results[idx].required_fuel = results[idx].components.total();
    }

    tracing::debug!(
        stops = n,
        departure_fuel = results[0].required_fuel,
        "solved required fuel"
    );
    results
}
