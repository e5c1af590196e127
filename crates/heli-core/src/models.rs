//! Core input models for the planning engine.
//!
//! These are the plain records the engine consumes. How they are loaded
//! (map UI, backend fetch, cache) is up to the caller.

use serde::{Deserialize, Serialize};

/// Push a problem for every value that is not a finite, non-negative number.
fn check_non_negative(problems: &mut Vec<String>, values: &[(&str, f64)]) {
    for (label, value) in values {
        if !value.is_finite() {
            problems.push(format!("{label} must be finite, got {value}"));
        } else if *value < 0.0 {
            problems.push(format!("{label} cannot be negative, got {value}"));
        }
    }
}

/// Performance and weight limits of one airframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftProfile {
    #[serde(default)]
    pub name: String,
    /// Cruise true airspeed in knots
    pub cruise_speed_kt: f64,
    /// Fuel burned per hour of flight (mass/hour)
    pub fuel_burn_per_hour: f64,
    pub max_usable_fuel: f64,
    pub max_takeoff_weight: f64,
    pub empty_weight: f64,
    pub max_structural_payload: f64,
    pub passenger_seat_limit: u32,
}

impl AircraftProfile {
    /// Validate the profile.
    /// Returns list of problems (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_non_negative(
            &mut problems,
            &[
                ("cruise_speed_kt", self.cruise_speed_kt),
                ("fuel_burn_per_hour", self.fuel_burn_per_hour),
                ("max_usable_fuel", self.max_usable_fuel),
                ("max_takeoff_weight", self.max_takeoff_weight),
                ("empty_weight", self.empty_weight),
                ("max_structural_payload", self.max_structural_payload),
            ],
        );

        if self.cruise_speed_kt.is_finite() && self.cruise_speed_kt <= 0.0 {
            problems.push("cruise_speed_kt must be greater than zero".to_string());
        }

        if self.empty_weight >= self.max_takeoff_weight {
            problems.push(format!(
                "empty_weight ({}) must be less than max_takeoff_weight ({})",
                self.empty_weight, self.max_takeoff_weight
            ));
        }

        problems
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// How reserve fuel is sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ReserveMethod {
    /// Fixed mass that must remain at the boundary
    Fixed { amount: f64 },
    /// Minutes of flight at the aircraft's burn rate
    TimeBased { minutes: f64 },
}

impl ReserveMethod {
    /// Reserve mass for an aircraft burning `burn_per_hour`.
    pub fn fuel(&self, burn_per_hour: f64) -> f64 {
        match *self {
            Self::Fixed { amount } => amount,
            Self::TimeBased { minutes } => minutes / 60.0 * burn_per_hour,
        }
    }
}

/// Operator fuel policy for one calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPolicy {
    pub reserve: ReserveMethod,
    /// Fraction of trip fuel carried as contingency (0.10 = 10%)
    pub contingency_fraction: f64,
    /// Added at the departure stop only
    pub taxi_fuel: f64,
    /// Fuel burned per hour while turning on deck
    pub deck_fuel_per_hour: f64,
    pub default_deck_minutes: f64,
    /// Standard passenger weight used for capacity figures
    pub passenger_unit_weight: f64,
}

impl FuelPolicy {
    /// Validate the policy.
    /// Returns list of problems (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let reserve = match self.reserve {
            ReserveMethod::Fixed { amount } => ("reserve.amount", amount),
            ReserveMethod::TimeBased { minutes } => ("reserve.minutes", minutes),
        };
        check_non_negative(
            &mut problems,
            &[
                reserve,
                ("contingency_fraction", self.contingency_fraction),
                ("taxi_fuel", self.taxi_fuel),
                ("deck_fuel_per_hour", self.deck_fuel_per_hour),
                ("default_deck_minutes", self.default_deck_minutes),
                ("passenger_unit_weight", self.passenger_unit_weight),
            ],
        );
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Default for FuelPolicy {
    fn default() -> Self {
        Self {
            reserve: ReserveMethod::Fixed { amount: 600.0 },
            contingency_fraction: 0.10,
            taxi_fuel: 50.0,
            deck_fuel_per_hour: 400.0,
            default_deck_minutes: 5.0,
            passenger_unit_weight: 220.0,
        }
    }
}

/// Wind and regional-minima driven fuel additions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherInput {
    #[serde(default)]
    pub wind_speed_kt: f64,
    /// True direction the wind blows from, degrees
    #[serde(default)]
    pub wind_direction_deg: f64,
    /// Airborne radar approach addition for each rig arrival
    #[serde(default)]
    pub ara_fuel: f64,
    /// Instrument approach addition for each airport arrival
    #[serde(default)]
    pub approach_fuel: f64,
}

impl WeatherInput {
    pub fn calm() -> Self {
        Self::default()
    }

    pub fn with_wind(mut self, direction_deg: f64, speed_kt: f64) -> Self {
        self.wind_direction_deg = direction_deg;
        self.wind_speed_kt = speed_kt;
        self
    }

    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_non_negative(
            &mut problems,
            &[
                ("wind_speed_kt", self.wind_speed_kt),
                ("ara_fuel", self.ara_fuel),
                ("approach_fuel", self.approach_fuel),
            ],
        );
        if !self.wind_direction_deg.is_finite() {
            problems.push(format!(
                "wind_direction_deg must be finite, got {}",
                self.wind_direction_deg
            ));
        }
        problems
    }
}

/// One point of the user's route, in flying order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteWaypoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub is_refuel: bool,
    #[serde(default)]
    pub is_destination: bool,
    /// Cargo aboard when departing this point
    #[serde(default)]
    pub cargo_weight: f64,
    /// Caller-assigned visit id. Keeps a repeat visit's overrides with that
    /// visit when other visits to the same site are added or removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RouteWaypoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            is_refuel: false,
            is_destination: false,
            cargo_weight: 0.0,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Mark this point as a place where fuel can be loaded.
    pub fn with_refuel(mut self) -> Self {
        self.is_refuel = true;
        self
    }

    pub fn with_cargo(mut self, cargo_weight: f64) -> Self {
        self.cargo_weight = cargo_weight;
        self
    }

    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            problems.push(format!("lat must be within [-90, 90], got {}", self.lat));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            problems.push(format!("lon must be within [-180, 180], got {}", self.lon));
        }
        check_non_negative(&mut problems, &[("cargo_weight", self.cargo_weight)]);
        problems
    }
}
