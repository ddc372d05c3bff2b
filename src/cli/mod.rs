//! CLI for the SLA gateway
//!
//! Subcommands:
//! - `serve`: run the gateway front door
//! - `check`: validate the configuration and gateway table, then exit

pub mod check;
pub mod serve;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// SLA Gateway - API-key authenticated, rate-limited reverse proxy
#[derive(Parser)]
#[command(name = "sla-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the gateway
    Serve(TableArgs),

    /// Validate configuration and exit
    Check(TableArgs),
}

#[derive(Args)]
pub struct TableArgs {
    /// Path to the gateway table (overrides the configured path)
    #[arg(long)]
    pub table: Option<PathBuf>,
}
