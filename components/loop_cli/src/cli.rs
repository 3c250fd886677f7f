//! Command-line argument definitions

use clap::Parser;

/// Command-line arguments for the turnloop demo binary.
#[derive(Debug, Parser)]
#[command(
    name = "turnloop",
    version,
    about = "Cooperative event-loop scheduler demos"
)]
pub struct Cli {
    /// Scenario to run (see --list)
    #[arg(long)]
    pub scenario: Option<String>,

    /// List available scenarios
    #[arg(long)]
    pub list: bool,

    /// Emit the execution trace as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the trace to a file instead of stdout
    #[arg(long)]
    pub out: Option<String>,

    /// Enable tracing output
    #[arg(long, short)]
    pub verbose: bool,
}
