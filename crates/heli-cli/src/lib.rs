//! Heli CLI - command line front end for the fuel and payload planner.
//!
//! Provides the `heli-plan` binary:
//! - plan: run the planner on a request file and print a table or JSON
//! - keys: list stop keys for use with `--set`

pub mod config;
pub mod render;
pub mod request;

pub use config::Config;
pub use request::{load_overrides, load_request, parse_override_arg, resolve_stop, PlanRequest};
