//! Per-stop user overrides and the engine that re-solves on every edit.
//!
//! Overrides are sparse: an unset field always falls back to the policy or
//! weather default. They are stored by `StopKey`, so editing the route does
//! not hand one stop's override to another.

use crate::engine::{recompute, PlanOutcome, PlanningInput};
use crate::error::{PlanningError, Result};
use crate::models::{AircraftProfile, FuelPolicy, RouteWaypoint, WeatherInput};
use crate::stops::{classify_stops, Stop, StopKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// A field a user may override on a single stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideField {
    ExtraFuel,
    AraFuel,
    ApproachFuel,
    DeckTimeMinutes,
    RequestedPassengers,
    RequestedWeight,
}

impl OverrideField {
    pub const ALL: [OverrideField; 6] = [
        Self::ExtraFuel,
        Self::AraFuel,
        Self::ApproachFuel,
        Self::DeckTimeMinutes,
        Self::RequestedPassengers,
        Self::RequestedWeight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExtraFuel => "extra_fuel",
            Self::AraFuel => "ara_fuel",
            Self::ApproachFuel => "approach_fuel",
            Self::DeckTimeMinutes => "deck_time_minutes",
            Self::RequestedPassengers => "requested_passengers",
            Self::RequestedWeight => "requested_weight",
        }
    }
}

impl fmt::Display for OverrideField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverrideField {
    type Err = String;

    /// Accepts `extra_fuel`, `extra-fuel` and `extraFuel` spellings.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().replace('_', "") == normalized)
            .ok_or_else(|| format!("unknown override field '{s}'"))
    }
}

/// Sparse override record for one stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StopOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_fuel: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ara_fuel: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approach_fuel: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_time_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_passengers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_weight: Option<f64>,
}

impl StopOverrides {
    pub fn get(&self, field: OverrideField) -> Option<f64> {
        match field {
            OverrideField::ExtraFuel => self.extra_fuel,
            OverrideField::AraFuel => self.ara_fuel,
            OverrideField::ApproachFuel => self.approach_fuel,
            OverrideField::DeckTimeMinutes => self.deck_time_minutes,
            OverrideField::RequestedPassengers => self.requested_passengers.map(f64::from),
            OverrideField::RequestedWeight => self.requested_weight,
        }
    }

    /// Set or clear one field. `value` must already be validated.
    fn put(&mut self, field: OverrideField, value: Option<f64>) {
        match field {
            OverrideField::ExtraFuel => self.extra_fuel = value,
            OverrideField::AraFuel => self.ara_fuel = value,
            OverrideField::ApproachFuel => self.approach_fuel = value,
            OverrideField::DeckTimeMinutes => self.deck_time_minutes = value,
            OverrideField::RequestedPassengers => {
                self.requested_passengers = value.map(|v| v as u32)
            }
            OverrideField::RequestedWeight => self.requested_weight = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        OverrideField::ALL.iter().all(|field| self.get(*field).is_none())
    }
}

/// Check an override value before it is stored.
///
/// Values outside aircraft limits are allowed (they become warnings); only
/// values that cannot describe any real plan are rejected.
pub fn validate_override(field: OverrideField, value: f64) -> Result<()> {
    let reject = |reason: &str| PlanningError::InvalidOverride {
        field,
        value,
        reason: reason.to_string(),
    };

    if !value.is_finite() {
        return Err(reject("must be a finite number"));
    }
    if value < 0.0 {
        return Err(reject("cannot be negative"));
    }
    if field == OverrideField::RequestedPassengers {
        if value.fract() != 0.0 {
            return Err(reject("passenger count must be a whole number"));
        }
        if value > f64::from(u32::MAX) {
            return Err(reject("passenger count is out of range"));
        }
    }
    Ok(())
}

/// Advisory note attached to one overridden field of a stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideWarning {
    pub field: OverrideField,
    pub message: String,
}

impl OverrideWarning {
    pub fn new(field: OverrideField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Warnings for overrides set on a stop where they have no effect.
pub fn placement_warnings(stop: &Stop) -> Vec<OverrideWarning> {
    let mut warnings = Vec::new();
    let overrides = &stop.overrides;

    if overrides.extra_fuel.is_some() && !stop.is_loading_point() {
        warnings.push(OverrideWarning::new(
            OverrideField::ExtraFuel,
            "ignored: extra fuel can only be loaded at departure or refuel stops",
        ));
    }
    if stop.is_departure() {
        for field in [OverrideField::AraFuel, OverrideField::ApproachFuel] {
            if overrides.get(field).is_some() {
                warnings.push(OverrideWarning::new(
                    field,
                    "ignored: no approach is flown into the departure stop",
                ));
            }
        }
    }
    if stop.is_loading_point() && overrides.deck_time_minutes.is_some() {
        warnings.push(OverrideWarning::new(
            OverrideField::DeckTimeMinutes,
            "ignored: deck time at the departure or a refuel stop is not carried as fuel",
        ));
    }
    if stop.is_destination() {
        for field in [
            OverrideField::DeckTimeMinutes,
            OverrideField::RequestedPassengers,
            OverrideField::RequestedWeight,
        ] {
            if overrides.get(field).is_some() {
                warnings.push(OverrideWarning::new(
                    field,
                    "ignored: nothing departs the final stop",
                ));
            }
        }
    }
    warnings
}

/// Sparse override storage keyed by stop identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideStore {
    entries: BTreeMap<StopKey, StopOverrides>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides for `key`, or an empty record.
    pub fn get(&self, key: &StopKey) -> StopOverrides {
        self.entries.get(key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: StopKey, field: OverrideField, value: f64) -> Result<()> {
        validate_override(field, value)?;
        self.entries.entry(key).or_default().put(field, Some(value));
        Ok(())
    }

    /// Fold every field of `other` into this store. Nothing changes if any
    /// value is invalid.
    pub fn merge(&mut self, other: &OverrideStore) -> Result<()> {
        let mut merged = self.clone();
        for (key, record) in other.iter() {
            for field in OverrideField::ALL {
                if let Some(value) = record.get(field) {
                    merged.set(key.clone(), field, value)?;
                }
            }
        }
        *self = merged;
        Ok(())
    }

    /// Clear one field. Returns true if something was removed.
    pub fn clear(&mut self, key: &StopKey, field: OverrideField) -> bool {
        let Some(record) = self.entries.get_mut(key) else {
            return false;
        };
        let had_value = record.get(field).is_some();
        record.put(field, None);
        if record.is_empty() {
            self.entries.remove(key);
        }
        had_value
    }

    /// Clear every field for one stop. Returns true if something was removed.
    pub fn clear_stop(&mut self, key: &StopKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &StopKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StopKey, &StopOverrides)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach stored overrides to freshly classified stops.
    pub fn apply_to(&self, stops: &mut [Stop]) {
        for stop in stops.iter_mut() {
            stop.overrides = self.get(&stop.key);
            if let Some(minutes) = stop.overrides.deck_time_minutes {
                if !stop.is_destination() {
                    stop.deck_time_minutes = minutes;
                }
            }
        }
    }
}

/// Match each old visit to at most one new visit, keeping order.
///
/// Longest common subsequence over visit identities (name, position and id,
/// without the `#n` suffix). Returns, per old visit, the index of its match
/// in `new`.
fn align_visits(old: &[StopKey], new: &[StopKey]) -> Vec<Option<usize>> {
    let (n, m) = (old.len(), new.len());
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut matches = vec![None; n];
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            matches[i] = Some(j);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    matches
}

fn visit_identities(waypoints: &[RouteWaypoint], count: usize) -> Vec<StopKey> {
    waypoints
        .iter()
        .take(count)
        .map(|wp| StopKey::for_waypoint(wp, 1))
        .collect()
}

/// Holds the current planning input and re-solves the full route on every
/// override or input edit.
///
/// Each edit is applied to a copy of the input first; the copy only replaces
/// the current state if the re-solve succeeds.
#[derive(Debug, Clone)]
pub struct OverrideEngine {
    input: PlanningInput,
    outcome: PlanOutcome,
    /// Overrides of removed visits whose key now names a different visit.
    /// They never re-attach.
    detached: Vec<(StopKey, StopOverrides)>,
}

impl OverrideEngine {
    pub fn new(input: PlanningInput) -> Result<Self> {
        let outcome = recompute(&input)?;
        Ok(Self {
            input,
            outcome,
            detached: Vec::new(),
        })
    }

    pub fn input(&self) -> &PlanningInput {
        &self.input
    }

    pub fn outcome(&self) -> &PlanOutcome {
        &self.outcome
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.input.overrides
    }

    /// Keys of the stops in the current route.
    pub fn stop_keys(&self) -> Result<Vec<StopKey>> {
        let stops = classify_stops(&self.input.waypoints, &self.input.policy)?;
        Ok(stops.into_iter().map(|stop| stop.key).collect())
    }

    /// Overrides whose stop is no longer in the route. Stored orphans
    /// re-attach if the stop comes back; detached ones are listed after them
    /// and never do.
    pub fn orphaned_overrides(&self) -> Vec<StopKey> {
        let live: HashSet<StopKey> = self.stop_keys().unwrap_or_default().into_iter().collect();
        self.input
            .overrides
            .iter()
            .filter(|(key, _)| !live.contains(*key))
            .map(|(key, _)| key.clone())
            .chain(self.detached.iter().map(|(key, _)| key.clone()))
            .collect()
    }

    /// Overrides dropped from the store by a route edit because their key
    /// was taken over by another visit of the same site.
    pub fn detached_overrides(&self) -> &[(StopKey, StopOverrides)] {
        &self.detached
    }

    pub fn apply_override(
        &mut self,
        key: &StopKey,
        field: OverrideField,
        value: f64,
    ) -> Result<&PlanOutcome> {
        if !self.stop_keys()?.contains(key) {
            return Err(PlanningError::UnknownStop {
                key: key.to_string(),
            });
        }
        let mut next = self.input.clone();
        next.overrides.set(key.clone(), field, value)?;
        tracing::debug!(stop = %key, %field, value, "applying override");
        self.commit(next)
    }

    /// Clear one field back to its computed default.
    pub fn reset_override(&mut self, key: &StopKey, field: OverrideField) -> Result<&PlanOutcome> {
        self.ensure_known(key)?;
        let mut next = self.input.clone();
        next.overrides.clear(key, field);
        tracing::debug!(stop = %key, %field, "resetting override");
        self.commit(next)
    }

    /// Clear every override field for one stop.
    pub fn reset_stop(&mut self, key: &StopKey) -> Result<&PlanOutcome> {
        self.ensure_known(key)?;
        let mut next = self.input.clone();
        next.overrides.clear_stop(key);
        tracing::debug!(stop = %key, "resetting all overrides for stop");
        self.commit(next)
    }

    pub fn set_aircraft(&mut self, aircraft: Option<AircraftProfile>) -> Result<&PlanOutcome> {
        let mut next = self.input.clone();
        next.aircraft = aircraft;
        self.commit(next)
    }

    pub fn set_policy(&mut self, policy: FuelPolicy) -> Result<&PlanOutcome> {
        let mut next = self.input.clone();
        next.policy = policy;
        self.commit(next)
    }

    pub fn set_weather(&mut self, weather: WeatherInput) -> Result<&PlanOutcome> {
        let mut next = self.input.clone();
        next.weather = weather;
        self.commit(next)
    }

    /// Replace the route. Overrides follow the visit they were set on, even
    /// when a `#n` key shifts because an earlier visit of the same site was
    /// added or removed.
    pub fn set_waypoints(&mut self, waypoints: Vec<RouteWaypoint>) -> Result<&PlanOutcome> {
        let old_keys = self.stop_keys()?;
        let new_keys: Vec<StopKey> = classify_stops(&waypoints, &self.input.policy)?
            .into_iter()
            .map(|stop| stop.key)
            .collect();
        let matches = align_visits(
            &visit_identities(&self.input.waypoints, old_keys.len()),
            &visit_identities(&waypoints, new_keys.len()),
        );

        let mut detached = self.detached.clone();
        let mut next = self.input.clone();
        next.waypoints = waypoints;
        next.overrides =
            rekey_overrides(&self.input.overrides, &old_keys, &new_keys, &matches, &mut detached);

        self.commit(next)?;
        self.detached = detached;
        Ok(&self.outcome)
    }

    fn ensure_known(&self, key: &StopKey) -> Result<()> {
        if self.input.overrides.contains(key) || self.stop_keys()?.contains(key) {
            Ok(())
        } else {
            Err(PlanningError::UnknownStop {
                key: key.to_string(),
            })
        }
    }

    fn commit(&mut self, next: PlanningInput) -> Result<&PlanOutcome> {
        let outcome = recompute(&next)?;
        self.input = next;
        self.outcome = outcome;
        Ok(&self.outcome)
    }
}

/// Move overrides from old keys to the keys of the visits they matched.
///
/// A removed visit keeps its override as an ordinary orphan unless its key
/// now belongs to another visit, in which case the override is detached.
fn rekey_overrides(
    store: &OverrideStore,
    old_keys: &[StopKey],
    new_keys: &[StopKey],
    matches: &[Option<usize>],
    detached: &mut Vec<(StopKey, StopOverrides)>,
) -> OverrideStore {
    let new_live: HashSet<&StopKey> = new_keys.iter().collect();
    let old_live: HashSet<&StopKey> = old_keys.iter().collect();
    let mut rekeyed = OverrideStore::new();
    let mut removed = Vec::new();

    for (old_key, matched) in old_keys.iter().zip(matches) {
        let Some(record) = store.entries.get(old_key).copied() else {
            continue;
        };
        match matched {
            Some(j) => {
                if new_keys[*j] != *old_key {
                    tracing::debug!(from = %old_key, to = %new_keys[*j], "override follows its visit");
                }
                rekeyed.entries.insert(new_keys[*j].clone(), record);
            }
            None if new_live.contains(old_key) => {
                tracing::warn!(stop = %old_key, "visit removed, its override is detached");
                detached.push((old_key.clone(), record));
            }
            None => removed.push((old_key.clone(), record)),
        }
    }

    let earlier_orphans = store
        .entries
        .iter()
        .filter(|(key, _)| !old_live.contains(*key))
        .map(|(key, record)| (key.clone(), *record));
    for (key, record) in removed.into_iter().chain(earlier_orphans) {
        if rekeyed.entries.contains_key(&key) {
            tracing::warn!(stop = %key, "orphaned override collides with a live visit, detaching");
            detached.push((key, record));
        } else {
            rekeyed.entries.insert(key, record);
        }
    }
    rekeyed
}
