//! Planner defaults from environment.
//!
//! These fill in the fuel policy and weather when a request file leaves
//! them out.

use heli_core::{FuelPolicy, ReserveMethod, WeatherInput};
use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub policy: FuelPolicy,
    pub weather: WeatherInput,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |name: &str| lookup(name).and_then(|s| s.trim().parse::<f64>().ok());
        let defaults = FuelPolicy::default();

        // Time-based reserve wins when both are set.
        let reserve = match (number("HELI_RESERVE_MINUTES"), number("HELI_RESERVE_FIXED")) {
            (Some(minutes), _) => ReserveMethod::TimeBased { minutes },
            (None, Some(amount)) => ReserveMethod::Fixed { amount },
            (None, None) => defaults.reserve,
        };

        Self {
            policy: FuelPolicy {
                reserve,
                contingency_fraction: number("HELI_CONTINGENCY_PCT")
                    .map(|pct| pct / 100.0)
                    .unwrap_or(defaults.contingency_fraction),
                taxi_fuel: number("HELI_TAXI_FUEL").unwrap_or(defaults.taxi_fuel),
                deck_fuel_per_hour: number("HELI_DECK_FUEL_PER_HOUR")
                    .unwrap_or(defaults.deck_fuel_per_hour),
                default_deck_minutes: number("HELI_DEFAULT_DECK_MINUTES")
                    .unwrap_or(defaults.default_deck_minutes),
                passenger_unit_weight: number("HELI_PASSENGER_WEIGHT")
                    .unwrap_or(defaults.passenger_unit_weight),
            },
            weather: WeatherInput {
                ara_fuel: number("HELI_ARA_FUEL").unwrap_or(0.0),
                approach_fuel: number("HELI_APPROACH_FUEL").unwrap_or(0.0),
                ..WeatherInput::calm()
            },
        }
    }
}
