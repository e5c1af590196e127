//! Planning request files and `--set` override arguments.

use crate::config::Config;
use anyhow::{anyhow, bail, Context, Result};
use heli_core::{
    AircraftProfile, FuelPolicy, OverrideField, OverrideStore, PlanningInput, RouteWaypoint,
    StopKey, WeatherInput,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// On-disk request. Anything left out comes from `Config`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub waypoints: Vec<RouteWaypoint>,
    #[serde(default)]
    pub aircraft: Option<AircraftProfile>,
    #[serde(default)]
    pub policy: Option<FuelPolicy>,
    #[serde(default)]
    pub weather: Option<WeatherInput>,
    #[serde(default)]
    pub overrides: Option<OverrideStore>,
}

impl PlanRequest {
    pub fn into_input(self, config: &Config) -> PlanningInput {
        PlanningInput {
            waypoints: self.waypoints,
            aircraft: self.aircraft,
            policy: self.policy.unwrap_or_else(|| config.policy.clone()),
            weather: self.weather.unwrap_or_else(|| config.weather.clone()),
            overrides: self.overrides.unwrap_or_default(),
        }
    }
}

pub fn load_request(path: &Path) -> Result<PlanRequest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read request {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid request {}", path.display()))
}

pub fn load_overrides(path: &Path) -> Result<OverrideStore> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read overrides {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid overrides {}", path.display()))
}

/// One `--set KEY:FIELD=VALUE` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideArg {
    pub stop: String,
    pub field: OverrideField,
    pub value: f64,
}

/// Parse `KEY:FIELD=VALUE`. The key is everything before the last `:`.
pub fn parse_override_arg(raw: &str) -> Result<OverrideArg> {
    let (target, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY:FIELD=VALUE, got '{raw}'"))?;
    let (stop, field) = target
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("expected KEY:FIELD before '=', got '{target}'"))?;
    if stop.trim().is_empty() {
        bail!("missing stop key in '{raw}'");
    }
    let field = field.parse::<OverrideField>().map_err(|e| anyhow!(e))?;
    let value = value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("'{value}' is not a number"))?;
    Ok(OverrideArg {
        stop: stop.trim().to_string(),
        field,
        value,
    })
}

/// Match a `--set` stop against the route's keys.
///
/// An exact key wins. Otherwise `NAME/id` matches the visit with that id,
/// and a bare site name matches its first visit.
pub fn resolve_stop(keys: &[StopKey], stop: &str) -> Result<StopKey> {
    if let Some(key) = keys.iter().find(|key| key.as_str() == stop) {
        return Ok(key.clone());
    }
    let found = match stop.split_once('/') {
        Some((name, id)) => {
            let prefix = format!("{name}@");
            let suffix = format!("/{id}");
            keys.iter().find(|key| {
                let key = key.as_str();
                let base = key.split_once('#').map_or(key, |(base, _)| base);
                key.starts_with(&prefix) && base.ends_with(&suffix)
            })
        }
        None => {
            let prefix = format!("{stop}@");
            keys.iter()
                .find(|key| key.as_str().starts_with(&prefix) && !key.as_str().contains('#'))
        }
    };
    found
        .cloned()
        .ok_or_else(|| anyhow!("no stop '{stop}' in route (see `heli-plan keys`)"))
}
