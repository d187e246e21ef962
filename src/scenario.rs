use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::{
    engine::{Simulation, SimulationSettings},
    island::{Island, PopulationSeed},
    params::{ParameterOverrides, Parameters},
    rng::RngManager,
};

fn default_years() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_years")]
    pub years: u64,
    /// Terrain symbols, one line per row.
    pub map: String,
    #[serde(default)]
    pub parameters: ParameterOverrides,
    #[serde(default)]
    pub population: Vec<PopulationSeed>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = Scenario::from_yaml(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(
            name = %scenario.name,
            description = scenario.description.as_deref().unwrap_or(""),
            path = %path.display(),
            "loaded scenario"
        );
        Ok(scenario)
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn parameters(&self) -> Result<Parameters> {
        let mut params = Parameters::default();
        params
            .apply(&self.parameters)
            .with_context(|| format!("Invalid parameters in scenario '{}'", self.name))?;
        Ok(params)
    }

    fn empty_island(&self) -> Result<Island> {
        Island::build(&self.map, self.parameters()?)
            .with_context(|| format!("Invalid map in scenario '{}'", self.name))
    }

    /// Builds the populated island. Drawn weights match those of
    /// `build_simulation(None)`.
    pub fn build_island(&self) -> Result<Island> {
        let mut island = self.empty_island()?;
        let mut rng = RngManager::new(self.seed);
        island
            .seed(&self.population, rng.stream("seeding"))
            .with_context(|| format!("Invalid population in scenario '{}'", self.name))?;
        Ok(island)
    }

    /// Builds a seeded simulation; `seed` overrides the scenario's seed.
    pub fn build_simulation(&self, seed: Option<u64>) -> Result<Simulation> {
        let settings = SimulationSettings {
            scenario_name: self.name.clone(),
            seed: seed.unwrap_or(self.seed),
        };
        let mut simulation = Simulation::new(self.empty_island()?, settings);
        simulation
            .seed(&self.population)
            .with_context(|| format!("Invalid population in scenario '{}'", self.name))?;
        Ok(simulation)
    }

    pub fn years(&self, override_years: Option<u64>) -> u64 {
        override_years.unwrap_or(self.years)
    }
}
