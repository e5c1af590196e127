//! Stop classification.
//!
//! Turns the ordered waypoint list into typed stops: the first point departs,
//! the last point is the destination, and everything between is an
//! intermediate rig or airport. The refuel flag rides along on intermediate
//! stops only.

use crate::error::{PlanningError, Result};
use crate::models::{FuelPolicy, RouteWaypoint};
use crate::overrides::StopOverrides;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Stable identity of a stop across rebuilds.
///
/// Built from the site name and coordinates, never from the array index, so
/// inserting or removing an unrelated waypoint leaves other keys untouched.
/// A waypoint `id` is appended as `/id`. A second visit with the same base
/// gets a `#2` suffix; that suffix depends on visit order, so routes that
/// revisit a site should give each visit an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopKey(String);

impl StopKey {
    pub fn for_site(name: &str, lat: f64, lon: f64, occurrence: usize) -> Self {
        Self::with_occurrence(format!("{}@{:.5},{:.5}", name.trim(), lat, lon), occurrence)
    }

    pub fn for_waypoint(wp: &RouteWaypoint, occurrence: usize) -> Self {
        let mut base = format!("{}@{:.5},{:.5}", wp.name.trim(), wp.lat, wp.lon);
        if let Some(id) = wp.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            base.push('/');
            base.push_str(id);
        }
        Self::with_occurrence(base, occurrence)
    }

    fn with_occurrence(base: String, occurrence: usize) -> Self {
        if occurrence > 1 {
            Self(format!("{base}#{occurrence}"))
        } else {
            Self(base)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for StopKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StopKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopRole {
    Departure,
    IntermediateAirport,
    IntermediateRig,
    Destination,
}

impl StopRole {
    pub fn is_intermediate(self) -> bool {
        matches!(self, Self::IntermediateAirport | Self::IntermediateRig)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Departure => "departure",
            Self::IntermediateAirport => "airport",
            Self::IntermediateRig => "rig",
            Self::Destination => "final stop",
        }
    }
}

/// What kind of landing site a stop is; decides ARA vs approach fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    Rig,
    Airport,
}

/// A classified stop. Index 0 departs, the last index is the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub key: StopKey,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub role: StopRole,
    pub site: SiteKind,
    pub is_refuel: bool,
    pub deck_time_minutes: f64,
    pub cargo_weight: f64,
    #[serde(default)]
    pub overrides: StopOverrides,
}

impl Stop {
    pub fn is_departure(&self) -> bool {
        self.role == StopRole::Departure
    }

    pub fn is_destination(&self) -> bool {
        self.role == StopRole::Destination
    }

    /// Departure and refuel stops are the only places fuel can be loaded.
    pub fn is_loading_point(&self) -> bool {
        self.is_departure() || self.is_refuel
    }
}

fn icao_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z]{4}$").expect("ICAO pattern compiles"))
}

fn rig_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\d|\b(rig|platform|spar|tlp|fpso|jack-?up|semi|drillship)\b")
            .expect("rig pattern compiles")
    })
}

/// Classify a site by name.
///
/// Four-letter ICAO identifiers are airports. Names carrying a block number
/// (`GC123`, `MC-778`) or a rig word (`Spar`, `TLP`) are rigs. Anything else
/// is treated as an airport.
pub fn classify_site(name: &str) -> SiteKind {
    let name = name.trim();
    if icao_pattern().is_match(name) {
        SiteKind::Airport
    } else if rig_pattern().is_match(name) {
        SiteKind::Rig
    } else {
        SiteKind::Airport
    }
}

/// Build typed stops from the ordered waypoint list.
///
/// The route ends at the first waypoint flagged `is_destination`; points after
/// it are dropped. Fails with `InvalidRoute` when fewer than two points remain
/// and with `InvalidWaypoint` for bad coordinates or cargo.
pub fn classify_stops(waypoints: &[RouteWaypoint], policy: &FuelPolicy) -> Result<Vec<Stop>> {
    let route = match waypoints.iter().position(|wp| wp.is_destination) {
        Some(idx) => {
            if idx + 1 < waypoints.len() {
                tracing::warn!(
                    dropped = waypoints.len() - idx - 1,
                    "waypoints after the flagged destination are ignored"
                );
            }
            &waypoints[..=idx]
        }
        None => waypoints,
    };

    if route.len() < 2 {
        return Err(PlanningError::InvalidRoute { count: route.len() });
    }

    let last = route.len() - 1;
    let mut occurrences: HashMap<StopKey, usize> = HashMap::new();
    let mut stops = Vec::with_capacity(route.len());

    for (idx, wp) in route.iter().enumerate() {
        let problems = wp.validate();
        if !problems.is_empty() {
            return Err(PlanningError::InvalidWaypoint {
                index: idx,
                name: wp.name.clone(),
                problems,
            });
        }

        let site = classify_site(&wp.name);
        let role = if idx == 0 {
            StopRole::Departure
        } else if idx == last {
            StopRole::Destination
        } else if site == SiteKind::Rig {
            StopRole::IntermediateRig
        } else {
            StopRole::IntermediateAirport
        };

        let seen = occurrences.entry(StopKey::for_waypoint(wp, 1)).or_insert(0);
        *seen += 1;

        stops.push(Stop {
            key: StopKey::for_waypoint(wp, *seen),
            name: wp.name.clone(),
            lat: wp.lat,
            lon: wp.lon,
            role,
            site,
            is_refuel: wp.is_refuel && role.is_intermediate(),
            deck_time_minutes: if role == StopRole::Destination {
                0.0
            } else {
                policy.default_deck_minutes
            },
            cargo_weight: wp.cargo_weight,
            overrides: StopOverrides::default(),
        });
    }

    tracing::debug!(stops = stops.len(), "classified route");
    Ok(stops)
}
