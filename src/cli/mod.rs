//! CLI commands
//!
//! Command implementations for the `qpr` binary.

mod auth;
mod contribute;
mod progress;
pub mod style;

pub use auth::{run_auth_setup, run_auth_test};
pub use contribute::{ContributeOptions, parse_group_spec, run_contribute};
pub use progress::CliProgress;
