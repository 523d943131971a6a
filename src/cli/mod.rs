//! CLI module
//!
//! - serve: boot storage and serve the HTTP API
//! - seed: load lessons from a JSON file

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{read_lessons, run, run_command, seed, seed_lessons, serve};
pub use config::{Config, PORT_ENV, STORAGE_URI_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_json;
