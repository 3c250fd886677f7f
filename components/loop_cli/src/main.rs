//! Turnloop demo CLI
//!
//! Entry point for the scheduler demos. Parses CLI arguments and
//! delegates to the Demo runner.

use clap::Parser as ClapParser;
use loop_cli::{Cli, Demo, ScenarioReport, SCENARIOS};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .init();
    }

    if cli.list {
        println!("Available scenarios:");
        for name in SCENARIOS {
            println!("  {name}");
        }
        return Ok(());
    }

    if let Some(name) = cli.scenario {
        let demo = Demo::new();
        match demo.run(&name) {
            Ok(report) => {
                let rendered = if cli.json {
                    serde_json::to_string_pretty(&report)?
                } else {
                    render_text(&report)
                };
                match cli.out {
                    Some(path) => std::fs::write(&path, rendered)?,
                    None => println!("{rendered}"),
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        // Default: show usage
        println!("Turnloop v0.1.0");
        println!();
        println!("Usage:");
        println!("  turnloop --scenario <NAME>   Run a demo scenario");
        println!("  turnloop --list              List available scenarios");
        println!();
        println!("Run 'turnloop --help' for more options.");
    }

    Ok(())
}

fn render_text(report: &ScenarioReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("scenario: {}\n", report.scenario));
    out.push_str("trace:\n");
    for entry in &report.trace {
        out.push_str(&format!("  {entry}\n"));
    }
    if !report.errors.is_empty() {
        out.push_str("errors:\n");
        for entry in &report.errors {
            out.push_str(&format!("  {entry}\n"));
        }
    }
    out
}
