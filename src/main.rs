use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use biosim::{animal::Species, scenario::ScenarioLoader};

#[derive(Debug, Parser)]
#[command(author, version, about = "Island ecosystem simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/tiny_island.yaml")]
    scenario: PathBuf,

    /// Override year count (uses scenario default when omitted)
    #[arg(long)]
    years: Option<u64>,

    /// Override the scenario's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print one JSON summary per year instead of a table row
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let years = scenario.years(cli.years);
    let mut simulation = scenario.build_simulation(cli.seed)?;

    if !cli.json {
        println!("{:>5} {:>8} {:>8}", "year", "herb", "carn");
    }
    simulation.run_with_hook(years, |summary| {
        if !cli.json {
            println!(
                "{:>5} {:>8} {:>8}",
                summary.year, summary.herbivores, summary.carnivores
            );
            return;
        }
        match serde_json::to_string(summary) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(%err, year = summary.year, "failed to encode summary"),
        }
    })?;

    let counts = simulation.island().aggregate_counts();
    info!(
        scenario = %scenario.name,
        years,
        herbivores = counts.of(Species::Herbivore),
        carnivores = counts.of(Species::Carnivore),
        total = counts.total(),
        "simulation finished"
    );
    Ok(())
}
