//! Passenger capacity at each departing stop.
//!
//! Capacity is derived from the fuel that has to be aboard when leaving a
//! stop. It never feeds back into the fuel solve: a requested load that does
//! not fit only flips `is_capacity_ok` and adds a warning.

use crate::fuel::StopFuel;
use crate::models::{AircraftProfile, FuelPolicy};
use crate::overrides::{OverrideField, OverrideWarning};
use crate::stops::Stop;
use serde::{Deserialize, Serialize};

/// Weight budgets when departing one stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityFigures {
    /// MTOW minus empty weight, fuel and cargo. May be negative.
    pub available_weight_budget: f64,
    /// Structural payload minus fuel and cargo. May be negative.
    pub structural_budget: f64,
    /// The tighter budget, clamped at zero
    pub max_passenger_weight: f64,
    pub max_passengers: u32,
}

impl CapacityFigures {
    pub fn compute(
        required_fuel: f64,
        cargo_weight: f64,
        aircraft: &AircraftProfile,
        policy: &FuelPolicy,
    ) -> Self {
        let available_weight_budget =
            aircraft.max_takeoff_weight - aircraft.empty_weight - required_fuel - cargo_weight;
        let structural_budget = aircraft.max_structural_payload - required_fuel - cargo_weight;
        let max_passenger_weight = available_weight_budget.min(structural_budget).max(0.0);

        let max_passengers = if policy.passenger_unit_weight > 0.0 {
            let by_weight = (max_passenger_weight / policy.passenger_unit_weight).floor();
            // Saturating cast; the seat limit caps it anyway.
            (by_weight as u32).min(aircraft.passenger_seat_limit)
        } else {
            aircraft.passenger_seat_limit
        };

        Self {
            available_weight_budget,
            structural_budget,
            max_passenger_weight,
            max_passengers,
        }
    }

    /// The raw (unclamped) limit, negative when fuel and cargo alone are too heavy.
    pub fn weight_limit(&self) -> f64 {
        self.available_weight_budget.min(self.structural_budget)
    }
}

/// Capacity verdict for one stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityAssessment {
    /// None for the destination
    pub capacity: Option<CapacityFigures>,
    pub is_capacity_ok: bool,
    pub exceeds_usable_fuel: bool,
    pub warnings: Vec<OverrideWarning>,
}

fn assess_stop(
    stop: &Stop,
    fuel: &StopFuel,
    aircraft: &AircraftProfile,
    policy: &FuelPolicy,
) -> CapacityAssessment {
    let exceeds_usable_fuel = fuel.required_fuel > aircraft.max_usable_fuel;
    let mut warnings = Vec::new();

    if exceeds_usable_fuel && fuel.components.extra > 0.0 {
        warnings.push(OverrideWarning::new(
            OverrideField::ExtraFuel,
            format!(
                "extra fuel pushes required fuel ({:.0}) past max usable fuel ({:.0})",
                fuel.required_fuel, aircraft.max_usable_fuel
            ),
        ));
    }

    if stop.is_destination() {
        return CapacityAssessment {
            capacity: None,
            is_capacity_ok: !exceeds_usable_fuel,
            exceeds_usable_fuel,
            warnings,
        };
    }

    let figures = CapacityFigures::compute(fuel.required_fuel, stop.cargo_weight, aircraft, policy);
    let mut ok = figures.weight_limit() >= 0.0 && !exceeds_usable_fuel;

    let requested = &stop.overrides;
    if let Some(weight) = requested.requested_weight {
        if weight > figures.available_weight_budget || weight > figures.structural_budget {
            ok = false;
            warnings.push(OverrideWarning::new(
                OverrideField::RequestedWeight,
                format!(
                    "requested weight {weight:.0} exceeds the passenger budget of {:.0}",
                    figures.max_passenger_weight
                ),
            ));
        }
    } else if let Some(passengers) = requested.requested_passengers {
        let weight = f64::from(passengers) * policy.passenger_unit_weight;
        if weight > figures.available_weight_budget || weight > figures.structural_budget {
            ok = false;
            warnings.push(OverrideWarning::new(
                OverrideField::RequestedPassengers,
                format!(
                    "{passengers} passengers ({weight:.0}) exceed the passenger budget of {:.0}",
                    figures.max_passenger_weight
                ),
            ));
        }
    }

    if let Some(passengers) = requested.requested_passengers {
        if passengers > aircraft.passenger_seat_limit {
            ok = false;
            warnings.push(OverrideWarning::new(
                OverrideField::RequestedPassengers,
                format!(
                    "{passengers} passengers exceed the seat limit of {}",
                    aircraft.passenger_seat_limit
                ),
            ));
        }
    }

    CapacityAssessment {
        capacity: Some(figures),
        is_capacity_ok: ok,
        exceeds_usable_fuel,
        warnings,
    }
}

/// Evaluate capacity for every stop, in route order.
pub fn evaluate_capacity(
    stops: &[Stop],
    fuel: &[StopFuel],
    aircraft: &AircraftProfile,
    policy: &FuelPolicy,
) -> Vec<CapacityAssessment> {
    stops
        .iter()
        .zip(fuel)
        .map(|(stop, stop_fuel)| {
            let assessment = assess_stop(stop, stop_fuel, aircraft, policy);
            if assessment.exceeds_usable_fuel {
                tracing::warn!(
                    stop = %stop.key,
                    required = stop_fuel.required_fuel,
                    usable = aircraft.max_usable_fuel,
                    "required fuel exceeds usable fuel"
                );
            } else if !assessment.is_capacity_ok {
                tracing::warn!(stop = %stop.key, "stop is over capacity");
            }
            assessment
        })
        .collect()
}
