//! The annual cycle.
//!
//! `Simulation` owns the island and runs the phases in a fixed order each year:
//! feeding, procreation, migration, then aging. Every phase finishes across the
//! whole island before the next one starts.

use anyhow::Result;
use tracing::info;

use crate::{
    animal::{Animal, Species},
    cell::SpeciesTally,
    error::ConfigError,
    island::{Island, PopulationSeed},
    rng::{PhaseRng, RngManager},
    snapshot::YearSummary,
    systems::{AgingSystem, FeedingSystem, MigrationSystem, ProcreationSystem, YearLedger},
    terrain::Coordinate,
};

#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub scenario_name: String,
    pub seed: u64,
}

pub struct YearContext<'a> {
    /// The year being simulated, starting at 1.
    pub year: u64,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &YearContext,
        island: &mut Island,
        ledger: &mut YearLedger,
        rng: &mut PhaseRng,
    ) -> Result<()>;
}

pub struct Simulation {
    island: Island,
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    settings: SimulationSettings,
    current_year: u64,
    history: Vec<YearSummary>,
}

impl Simulation {
    pub fn new(island: Island, settings: SimulationSettings) -> Self {
        let systems: Vec<Box<dyn System>> = vec![
            Box::new(FeedingSystem::new()),
            Box::new(ProcreationSystem::new()),
            Box::new(MigrationSystem::new()),
            Box::new(AgingSystem::new()),
        ];
        Self {
            island,
            rng: RngManager::new(settings.seed),
            systems,
            settings,
            current_year: 0,
            history: Vec::new(),
        }
    }

    /// Number of completed years.
    pub fn current_year(&self) -> u64 {
        self.current_year
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Summaries of every completed year, oldest first.
    pub fn history(&self) -> &[YearSummary] {
        &self.history
    }

    /// Seeds animals between runs.
    pub fn add_population(&mut self, at: Coordinate, animals: Vec<Animal>) -> Result<(), ConfigError> {
        self.island.add_population(at, animals)
    }

    /// Seeds from a population list. Missing weights come from the "seeding" stream.
    pub fn seed(&mut self, seeds: &[PopulationSeed]) -> Result<(), ConfigError> {
        let rng = self.rng.stream("seeding");
        self.island.seed(seeds, rng)
    }

    /// Removes every animal. The year counter and history are kept.
    pub fn clear_population(&mut self) -> SpeciesTally {
        self.island.clear_population()
    }

    pub fn run_one_year(&mut self) -> Result<YearSummary> {
        let year = self.current_year + 1;
        let ctx = YearContext {
            year,
            scenario_name: &self.settings.scenario_name,
        };
        let mut ledger = YearLedger::default();
        for system in &mut self.systems {
            let rng = self.rng.stream(system.name());
            system.run(&ctx, &mut self.island, &mut ledger, rng)?;
        }
        self.current_year = year;

        let summary = self.summarize(year, &ledger);
        info!(
            scenario = %self.settings.scenario_name,
            year,
            herbivores = summary.herbivores,
            carnivores = summary.carnivores,
            "year complete"
        );
        self.history.push(summary.clone());
        Ok(summary)
    }

    pub fn run(&mut self, years: u64) -> Result<()> {
        self.run_with_hook(years, |_| {})
    }

    /// Runs `years` years, handing each summary to `hook` as it completes.
    pub fn run_with_hook<F>(&mut self, years: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&YearSummary),
    {
        for _ in 0..years {
            let summary = self.run_one_year()?;
            hook(&summary);
        }
        Ok(())
    }

    fn summarize(&self, year: u64, ledger: &YearLedger) -> YearSummary {
        let (herbivores, carnivores) = self.island.population_counts();
        YearSummary {
            year,
            herbivores,
            carnivores,
            herbivore_stats: self.island.species_stats(Species::Herbivore),
            carnivore_stats: self.island.species_stats(Species::Carnivore),
            births: ledger.births,
            deaths: ledger.deaths,
            migrants: ledger.migrants,
            herbivores_killed: ledger.herbivores_killed,
            fodder_eaten: ledger.fodder_eaten,
        }
    }
}
