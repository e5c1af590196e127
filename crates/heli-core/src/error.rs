//! Structural errors raised by the planning engine.
//!
//! Capacity and fuel-limit problems are never errors; they are reported as
//! flags and warnings on each stop result.

use crate::overrides::OverrideField;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanningError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// A route needs at least a departure and a destination.
    #[error("route needs at least 2 waypoints, got {count}")]
    InvalidRoute { count: usize },

    #[error("waypoint {index} ({name}) rejected: {}", problems.join("; "))]
    InvalidWaypoint {
        index: usize,
        name: String,
        problems: Vec<String>,
    },

    #[error("aircraft profile rejected: {}", problems.join("; "))]
    InvalidAircraft { problems: Vec<String> },

    #[error("fuel policy rejected: {}", problems.join("; "))]
    InvalidPolicy { problems: Vec<String> },

    #[error("weather input rejected: {}", problems.join("; "))]
    InvalidWeather { problems: Vec<String> },

    #[error("invalid value {value} for {field}: {reason}")]
    InvalidOverride {
        field: OverrideField,
        value: f64,
        reason: String,
    },

    #[error("no stop with key '{key}' in the current route")]
    UnknownStop { key: String },
}
