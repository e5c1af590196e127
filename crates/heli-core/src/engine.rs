//! The `recompute` pipeline.
//!
//! classify stops -> attach overrides -> legs -> required fuel -> capacity
//! -> per-stop results and summary.
//!
//! Every call rebuilds everything from the input. Stop counts are in the
//! tens, so nothing is cached between runs.

use crate::capacity::{evaluate_capacity, CapacityFigures};
use crate::error::{PlanningError, Result};
use crate::fuel::{solve_required_fuel, FuelComponents};
use crate::legs::{compute_legs, Leg};
use crate::models::{AircraftProfile, FuelPolicy, RouteWaypoint, WeatherInput};
use crate::overrides::{placement_warnings, OverrideStore, OverrideWarning, StopOverrides};
use crate::stops::{classify_stops, SiteKind, StopKey, StopRole};
use serde::{Deserialize, Serialize};

/// Everything one planning run needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningInput {
    pub waypoints: Vec<RouteWaypoint>,
    /// None until the user picks an airframe
    #[serde(default)]
    pub aircraft: Option<AircraftProfile>,
    #[serde(default)]
    pub policy: FuelPolicy,
    #[serde(default)]
    pub weather: WeatherInput,
    #[serde(default)]
    pub overrides: OverrideStore,
}

impl PlanningInput {
    pub fn new(waypoints: Vec<RouteWaypoint>) -> Self {
        Self {
            waypoints,
            ..Self::default()
        }
    }

    pub fn with_waypoints(mut self, waypoints: Vec<RouteWaypoint>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn with_aircraft(mut self, aircraft: AircraftProfile) -> Self {
        self.aircraft = Some(aircraft);
        self
    }

    pub fn with_policy(mut self, policy: FuelPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_weather(mut self, weather: WeatherInput) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideStore) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Computed figures for one stop, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopResult {
    pub index: usize,
    pub key: StopKey,
    pub name: String,
    pub role: StopRole,
    pub site: SiteKind,
    pub is_refuel: bool,
    pub deck_time_minutes: f64,
    pub cargo_weight: f64,
    #[serde(default)]
    pub overrides: StopOverrides,
    /// Fuel that must be aboard when departing (or, at the destination,
    /// remaining on landing)
    pub required_fuel: f64,
    pub fuel_components: FuelComponents,
    pub arrival_approach_fuel: f64,
    pub exceeds_usable_fuel: bool,
    /// None for the destination
    pub capacity: Option<CapacityFigures>,
    pub is_capacity_ok: bool,
    #[serde(default)]
    pub warnings: Vec<OverrideWarning>,
}

impl StopResult {
    pub fn max_passengers(&self) -> Option<u32> {
        self.capacity.map(|c| c.max_passengers)
    }

    pub fn max_passenger_weight(&self) -> Option<f64> {
        self.capacity.map(|c| c.max_passenger_weight)
    }
}

/// Route-level totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MinimalFuelSummary {
    pub departure_required_fuel: f64,
    pub total_distance_nm: f64,
    pub total_flight_time_hours: f64,
    pub total_trip_fuel: f64,
    pub max_required_fuel: f64,
    pub refuel_stops: usize,
    pub stops_over_capacity: usize,
    pub all_capacity_ok: bool,
}

impl MinimalFuelSummary {
    pub fn from_results(stops: &[StopResult], legs: &[Leg]) -> Self {
        let stops_over_capacity = stops.iter().filter(|s| !s.is_capacity_ok).count();
        Self {
            departure_required_fuel: stops.first().map(|s| s.required_fuel).unwrap_or(0.0),
            total_distance_nm: legs.iter().map(|l| l.distance_nm).sum(),
            total_flight_time_hours: legs.iter().map(|l| l.flight_time_hours).sum(),
            total_trip_fuel: legs.iter().map(|l| l.fuel_burned).sum(),
            max_required_fuel: stops.iter().map(|s| s.required_fuel).fold(0.0, f64::max),
            refuel_stops: stops.iter().filter(|s| s.is_refuel).count(),
            stops_over_capacity,
            all_capacity_ok: stops_over_capacity == 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanResult {
    pub stops: Vec<StopResult>,
    pub legs: Vec<Leg>,
    pub summary: MinimalFuelSummary,
}

/// Input a plan cannot be produced without, but which the user is expected
/// to supply shortly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInput {
    Aircraft,
}

/// Result of one `recompute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    Planned(FlightPlanResult),
    /// Placeholder state: no numeric table is shown.
    InsufficientInput { missing: MissingInput },
}

impl PlanOutcome {
    pub fn plan(&self) -> Option<&FlightPlanResult> {
        match self {
            Self::Planned(plan) => Some(plan),
            Self::InsufficientInput { .. } => None,
        }
    }

    pub fn is_planned(&self) -> bool {
        self.plan().is_some()
    }
}

/// Run the full planning pipeline.
///
/// Fails only on structural problems: fewer than two waypoints, or a
/// waypoint, policy, weather input or aircraft profile with invalid numbers.
/// A missing aircraft is a normal state and yields
/// `PlanOutcome::InsufficientInput`.
pub fn recompute(input: &PlanningInput) -> Result<PlanOutcome> {
    let mut stops = classify_stops(&input.waypoints, &input.policy)?;

    let problems = input.policy.validate();
    if !problems.is_empty() {
        return Err(PlanningError::InvalidPolicy { problems });
    }
    let problems = input.weather.validate();
    if !problems.is_empty() {
        return Err(PlanningError::InvalidWeather { problems });
    }

    let Some(aircraft) = input.aircraft.as_ref() else {
        tracing::debug!(stops = stops.len(), "no aircraft selected, skipping plan");
        return Ok(PlanOutcome::InsufficientInput {
            missing: MissingInput::Aircraft,
        });
    };

    let problems = aircraft.validate();
    if !problems.is_empty() {
        return Err(PlanningError::InvalidAircraft { problems });
    }

    input.overrides.apply_to(&mut stops);

    let legs = compute_legs(&stops, aircraft, &input.weather);
    let fuel = solve_required_fuel(&stops, &legs, aircraft, &input.policy, &input.weather);
    let capacity = evaluate_capacity(&stops, &fuel, aircraft, &input.policy);

    let results: Vec<StopResult> = stops
        .into_iter()
        .zip(fuel)
        .zip(capacity)
        .enumerate()
        .map(|(index, ((stop, stop_fuel), assessment))| {
            let mut warnings = placement_warnings(&stop);
            for warning in &warnings {
                tracing::warn!(stop = %stop.key, field = %warning.field, "{}", warning.message);
            }
            warnings.extend(assessment.warnings);

            StopResult {
                index,
                key: stop.key,
                name: stop.name,
                role: stop.role,
                site: stop.site,
                is_refuel: stop.is_refuel,
                deck_time_minutes: stop.deck_time_minutes,
                cargo_weight: stop.cargo_weight,
                overrides: stop.overrides,
                required_fuel: stop_fuel.required_fuel,
                fuel_components: stop_fuel.components,
                arrival_approach_fuel: stop_fuel.arrival_approach_fuel,
                exceeds_usable_fuel: assessment.exceeds_usable_fuel,
                capacity: assessment.capacity,
                is_capacity_ok: assessment.is_capacity_ok,
                warnings,
            }
        })
        .collect();

    let summary = MinimalFuelSummary::from_results(&results, &legs);
    tracing::info!(
        aircraft = %aircraft.name,
        stops = results.len(),
        departure_fuel = summary.departure_required_fuel,
        all_capacity_ok = summary.all_capacity_ok,
        "plan computed"
    );

    Ok(PlanOutcome::Planned(FlightPlanResult {
        stops: results,
        legs,
        summary,
    }))
}
