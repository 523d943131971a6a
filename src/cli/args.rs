//! CLI argument definitions using clap
//!
//! Commands:
//! - afterschool serve [--config <path>] [--port <n>]
//! - afterschool seed --file <lessons.json> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// afterschool - lesson catalog and order service
#[derive(Parser, Debug)]
#[command(name = "afterschool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to storage and serve the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./afterschool.json")]
        config: PathBuf,

        /// Port override (takes precedence over config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load lessons from a JSON array into the lessons collection
    Seed {
        /// Path to configuration file
        #[arg(long, default_value = "./afterschool.json")]
        config: PathBuf,

        /// JSON file holding an array of lessons
        #[arg(long)]
        file: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
