//! rebuild-funding: run a household funding-search scenario
//!
//! Reads a JSON scenario, runs one funding search per household and prints
//! each household's outcome and story. `--events` also prints the event log
//! as JSON lines.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rebuild_funding_core::{run_scenario, ScenarioConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable
const DEFAULT_LOG: &str = "rebuild_funding_core=warn,info";

#[derive(Parser)]
#[command(name = "rebuild-funding")]
#[command(about = "Simulate how households search for money to rebuild after a disaster")]
struct Cli {
    /// Path to the JSON scenario file
    scenario: PathBuf,

    /// Print the simulation event log
    #[arg(long)]
    events: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let content = std::fs::read_to_string(&cli.scenario)
        .with_context(|| format!("reading {}", cli.scenario.display()))?;
    let config = ScenarioConfig::from_json(&content)?;

    info!(scenario = %cli.scenario.display(), "running scenario");
    let run = run_scenario(&config)?;

    for result in &run.results {
        let household = &result.household;
        let outcome = result
            .outcome
            .as_ref()
            .map_or("unfinished", |outcome| outcome.kind());
        println!(
            "{} ({}): {} | funds {} | debt {}",
            household.id(),
            household.name(),
            outcome,
            household.money_to_rebuild(),
            household.debt()
        );
        if !household.story().is_empty() {
            println!("    {}", household.story().to_text().trim_end());
        }
    }
    println!("Simulation ended on day {}", run.final_time);

    if cli.events {
        for event in run.events.events() {
            println!("{}", serde_json::to_string(event)?);
        }
    }

    Ok(())
}

/// `RUST_LOG` directives, falling back to [`DEFAULT_LOG`]
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG))
}
