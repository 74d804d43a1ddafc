//! CLI module for the Telepsych API
//!
//! - `serve`: run the HTTP API
//! - `check`: probe a running server

pub mod check;
pub mod serve;

use clap::{Parser, Subcommand};

/// Telepsych API - authentication, user directory and prescriptions
#[derive(Parser)]
#[command(name = "telepsych-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve(serve::ServeArgs),

    /// Probe a running server and log diagnostics
    Check(check::CheckArgs),
}
