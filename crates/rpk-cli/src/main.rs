//! rpk operator CLI entrypoint.
//!
//! - `rpk simulate` - Replay a call timeline through a debounce or throttle
//! - `rpk viewport` - Compute the rendered window of a virtualized list

#![forbid(unsafe_code)]

mod simulate;
mod viewport;

use std::io::IsTerminal;

use clap::{Parser, Subcommand, ValueEnum};
use rpk_telemetry::{TelemetryConfig, init_telemetry};

/// Render performance toolkit CLI.
#[derive(Parser)]
#[command(name = "rpk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a call timeline through a rate limiter.
    ///
    /// Every call is delivered in real time both to the bare callback and to
    /// the wrapped one, and the report shows how many executions the limiter
    /// saved.
    ///
    /// Example: rpk simulate debounce --at 0,10,20,300 --wait-ms 100
    Simulate(simulate::SimulateArgs),

    /// Compute which rows of a fixed-size list are rendered.
    ///
    /// Example: rpk viewport --scroll-top 3600 --viewport-height 600
    ///          --item-height 180 --item-count 10000
    Viewport(viewport::ViewportArgs),
}

/// Output format: json (machine-readable) or human (pretty-printed).
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Human,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout is clean for JSON output.
    let telemetry = TelemetryConfig::from_env()?.with_ansi(std::io::stderr().is_terminal());
    init_telemetry(telemetry)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate::run(args),
        Commands::Viewport(args) => viewport::run(&args),
    }
}
