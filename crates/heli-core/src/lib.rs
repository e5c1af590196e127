pub mod capacity;
pub mod display;
pub mod engine;
pub mod error;
pub mod fuel;
pub mod legs;
pub mod models;
pub mod overrides;
pub mod spatial;
pub mod stops;

pub use capacity::{evaluate_capacity, CapacityAssessment, CapacityFigures};
pub use engine::{
    recompute, FlightPlanResult, MinimalFuelSummary, MissingInput, PlanOutcome, PlanningInput,
    StopResult,
};
pub use error::{PlanningError, Result};
pub use fuel::{solve_required_fuel, FuelComponents, StopFuel};
pub use legs::{compute_legs, Leg, MIN_GROUND_SPEED_KT};
pub use models::{AircraftProfile, FuelPolicy, ReserveMethod, RouteWaypoint, WeatherInput};
pub use overrides::{
    OverrideEngine, OverrideField, OverrideStore, OverrideWarning, StopOverrides,
};
pub use spatial::{distance_nm, haversine_distance};
pub use stops::{classify_stops, SiteKind, Stop, StopKey, StopRole};
