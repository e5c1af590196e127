//! Per-leg distance, course, wind-corrected ground speed, time and fuel.
//!
//! Legs are derived from a stop snapshot and rebuilt wholesale whenever any
//! input changes. All values keep full precision; rounding is a display
//! concern (see `display`).

use crate::models::{AircraftProfile, WeatherInput};
use crate::spatial::{distance_nm, initial_course_deg};
use crate::stops::{Stop, StopKey};
use serde::{Deserialize, Serialize};

/// Ground speed never drops below this, so strong headwinds can't blow up
/// the time division.
pub const MIN_GROUND_SPEED_KT: f64 = 10.0;

/// Distances below this are treated as the same point.
const ZERO_DISTANCE_NM: f64 = 1e-9;

/// Leg `index` connects stop `index` to stop `index + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub index: usize,
    pub from: StopKey,
    pub to: StopKey,
    pub distance_nm: f64,
    /// Initial true course, degrees
    pub course_deg: f64,
    /// Positive = headwind, negative = tailwind
    pub headwind_kt: f64,
    /// Positive = wind from the right
    pub crosswind_kt: f64,
    pub ground_speed_kt: f64,
    pub flight_time_hours: f64,
    pub fuel_burned: f64,
}

/// Split the wind into head and cross components relative to `course_deg`.
///
/// Returns (headwind_kt, crosswind_kt).
pub fn wind_components(course_deg: f64, weather: &WeatherInput) -> (f64, f64) {
    if weather.wind_speed_kt <= 0.0 {
        return (0.0, 0.0);
    }
    let relative = (weather.wind_direction_deg - course_deg).to_radians();
    (
        weather.wind_speed_kt * relative.cos(),
        weather.wind_speed_kt * relative.sin(),
    )
}

/// Wind-triangle ground speed for a given true airspeed and course.
///
/// The crosswind is held off with a crab angle, which costs along-track
/// speed; the headwind component is then subtracted.
pub fn ground_speed_kt(tas_kt: f64, course_deg: f64, weather: &WeatherInput) -> f64 {
    let (headwind, crosswind) = wind_components(course_deg, weather);
    let along_track_sq = tas_kt * tas_kt - crosswind * crosswind;
    if along_track_sq <= 0.0 {
        return MIN_GROUND_SPEED_KT;
    }
    (along_track_sq.sqrt() - headwind).max(MIN_GROUND_SPEED_KT)
}

impl Leg {
    pub fn between(
        index: usize,
        from: &Stop,
        to: &Stop,
        aircraft: &AircraftProfile,
        weather: &WeatherInput,
    ) -> Self {
        let distance_nm = distance_nm(from.lat, from.lon, to.lat, to.lon);
        if distance_nm < ZERO_DISTANCE_NM {
            return Self {
                index,
                from: from.key.clone(),
                to: to.key.clone(),
                distance_nm: 0.0,
                course_deg: 0.0,
                headwind_kt: 0.0,
                crosswind_kt: 0.0,
                ground_speed_kt: aircraft.cruise_speed_kt.max(MIN_GROUND_SPEED_KT),
                flight_time_hours: 0.0,
                fuel_burned: 0.0,
            };
        }

        let course_deg = initial_course_deg(from.lat, from.lon, to.lat, to.lon);
        let (headwind_kt, crosswind_kt) = wind_components(course_deg, weather);
        let ground_speed_kt = ground_speed_kt(aircraft.cruise_speed_kt, course_deg, weather);
        let flight_time_hours = distance_nm / ground_speed_kt;

        Self {
            index,
            from: from.key.clone(),
            to: to.key.clone(),
            distance_nm,
            course_deg,
            headwind_kt,
            crosswind_kt,
            ground_speed_kt,
            flight_time_hours,
            fuel_burned: flight_time_hours * aircraft.fuel_burn_per_hour,
        }
    }
}

/// Compute every leg of the stop sequence, in order.
pub fn compute_legs(stops: &[Stop], aircraft: &AircraftProfile, weather: &WeatherInput) -> Vec<Leg> {
    let legs: Vec<Leg> = stops
        .windows(2)
        .enumerate()
        .map(|(idx, pair)| Leg::between(idx, &pair[0], &pair[1], aircraft, weather))
        .collect();
    tracing::debug!(
        legs = legs.len(),
        total_nm = legs.iter().map(|leg| leg.distance_nm).sum::<f64>(),
        "computed legs"
    );
    legs
}
