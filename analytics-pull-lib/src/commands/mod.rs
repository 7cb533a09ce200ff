//! Command-line interface and orchestration for analytics-pull
//!
//! # Commands
//!
//! - **pull**: Load the configuration, start one [`Scheduler`](crate::scheduler::Scheduler)
//!   per `[[input]]` table, and write every emitted record as a line of JSON to stdout
//!   or to a file. Ctrl-C stops all schedulers at their next safe point.
//! - **init**: Generate a default configuration file
//! - **validate**: Load a configuration file and check every input
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! appropriate command handler. All console interaction goes through the [`Host`]
//! trait so commands can be exercised in tests.

mod common;
mod config;
mod host;
mod init;
mod pull;
mod run;
mod validate;

pub use common::LogLevel;
pub use config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_TOML, InputConfig};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use pull::{PullArgs, pull_reports};
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
