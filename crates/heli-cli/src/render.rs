//! Text and JSON rendering of a plan outcome.

use anyhow::Result;
use chrono::{DateTime, Utc};
use heli_core::display::{format_hhmm, format_mass};
use heli_core::{FlightPlanResult, MissingInput, PlanOutcome, StopResult};
use serde::Serialize;
use std::fmt::Write;

/// JSON report envelope.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: &'a PlanOutcome,
}

pub fn render_json(outcome: &PlanOutcome, generated_at: DateTime<Utc>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Report {
        generated_at,
        outcome,
    })?)
}

pub fn render_table(outcome: &PlanOutcome) -> String {
    match outcome {
        PlanOutcome::Planned(plan) => plan_table(plan),
        PlanOutcome::InsufficientInput { missing } => placeholder(*missing),
    }
}

fn placeholder(missing: MissingInput) -> String {
    match missing {
        MissingInput::Aircraft => {
            "No aircraft selected. Add an \"aircraft\" profile to the request to see fuel figures.\n"
                .to_string()
        }
    }
}

fn stop_label(stop: &StopResult) -> String {
    if stop.is_refuel {
        format!("{} (refuel)", stop.role.label())
    } else {
        stop.role.label().to_string()
    }
}

fn plan_table(plan: &FlightPlanResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>2}  {:<10} {:<16} {:>8} {:>7} {:>6} {:>5} {:>6} {:>6} {:>7} {:>4}  {}",
        "#", "STOP", "ROLE", "REQ", "TRIP", "CONT", "DECK", "APPR", "EXTRA", "PAX WT", "PAX", "OK"
    );

    for stop in &plan.stops {
        let c = &stop.fuel_components;
        let (pax_weight, pax) = match stop.capacity {
            Some(capacity) => (
                format_mass(capacity.max_passenger_weight),
                capacity.max_passengers.to_string(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        let ok = if stop.exceeds_usable_fuel {
            "FUEL"
        } else if stop.is_capacity_ok {
            "yes"
        } else {
            "NO"
        };
        let _ = writeln!(
            out,
            "{:>2}  {:<10} {:<16} {:>8} {:>7} {:>6} {:>5} {:>6} {:>6} {:>7} {:>4}  {}",
            stop.index,
            stop.name,
            stop_label(stop),
            format_mass(stop.required_fuel),
            format_mass(c.trip),
            format_mass(c.contingency),
            format_mass(c.deck),
            format_mass(c.ara + c.approach),
            format_mass(c.extra),
            pax_weight,
            pax,
            ok
        );
    }

    let _ = writeln!(out);
    for leg in &plan.legs {
        let _ = writeln!(
            out,
            "leg {}: {:.1} nm, course {:03.0}, GS {:.0} kt, {}, burn {}",
            leg.index,
            leg.distance_nm,
            leg.course_deg,
            leg.ground_speed_kt,
            format_hhmm(leg.flight_time_hours),
            format_mass(leg.fuel_burned)
        );
    }

    let summary = &plan.summary;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Departure fuel {} | {:.1} nm | {} | trip fuel {} | refuel stops {} | capacity {}",
        format_mass(summary.departure_required_fuel),
        summary.total_distance_nm,
        format_hhmm(summary.total_flight_time_hours),
        format_mass(summary.total_trip_fuel),
        summary.refuel_stops,
        if summary.all_capacity_ok {
            "ok".to_string()
        } else {
            format!("{} stop(s) over", summary.stops_over_capacity)
        }
    );

    for stop in &plan.stops {
        for warning in &stop.warnings {
            let _ = writeln!(out, "warning: {} {}: {}", stop.name, warning.field, warning.message);
        }
    }
    out
}
