//! Helicopter fuel and payload planner.
//!
//! Usage:
//!   heli-plan plan --input route.json --set GC123:requested_passengers=8
//!   heli-plan keys --input route.json

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use heli_cli::render::{render_json, render_table};
use heli_cli::{load_overrides, load_request, parse_override_arg, resolve_stop, Config};
use heli_core::{classify_stops, OverrideEngine};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute required fuel and capacity for every stop
    Plan {
        /// Planning request (JSON)
        #[arg(long, short)]
        input: PathBuf,

        /// Saved overrides (JSON map of stop key to fields)
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Override one field, e.g. GC123:extra_fuel=200 or GC123/pm:requested_weight=900
        #[arg(long = "set", value_name = "KEY:FIELD=VALUE")]
        sets: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List the stop keys of a route
    Keys {
        #[arg(long, short)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("heli_cli=info".parse()?)
        .add_directive("heli_core=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs)?;
    let config = Config::from_env();

    match args.command {
        Command::Plan {
            input,
            overrides,
            sets,
            format,
        } => {
            let mut planning = load_request(&input)?.into_input(&config);
            if let Some(path) = overrides {
                planning
                    .overrides
                    .merge(&load_overrides(&path)?)
                    .with_context(|| format!("invalid overrides in {}", path.display()))?;
            }

            let mut engine = OverrideEngine::new(planning).context("planning failed")?;
            if !sets.is_empty() {
                let keys = engine.stop_keys()?;
                for raw in &sets {
                    let arg = parse_override_arg(raw)?;
                    let key = resolve_stop(&keys, &arg.stop)?;
                    engine
                        .apply_override(&key, arg.field, arg.value)
                        .with_context(|| format!("cannot apply --set {raw}"))?;
                }
            }

            for key in engine.orphaned_overrides() {
                tracing::warn!(stop = %key, "override does not match any stop in the route");
            }

            match format {
                OutputFormat::Table => print!("{}", render_table(engine.outcome())),
                OutputFormat::Json => println!("{}", render_json(engine.outcome(), Utc::now())?),
            }
        }
        Command::Keys { input } => {
            let planning = load_request(&input)?.into_input(&config);
            let stops = classify_stops(&planning.waypoints, &planning.policy)?;
            for stop in stops {
                println!("{:<32} {}", stop.key, stop.role.label());
            }
        }
    }

    Ok(())
}
