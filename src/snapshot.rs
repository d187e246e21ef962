//! Read-only views handed to visualisation and statistics consumers.

use serde::{Deserialize, Serialize};

use crate::animal::{Animal, Species};
use crate::cell::SpeciesTally;
use crate::params::SpeciesParams;
use crate::terrain::TerrainType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellCounts {
    pub row: usize,
    pub col: usize,
    pub terrain: TerrainType,
    pub fodder: f64,
    pub herbivores: usize,
    pub carnivores: usize,
}

/// Island totals plus one entry per land cell, in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub herbivores: usize,
    pub carnivores: usize,
    pub cells: Vec<CellCounts>,
}

impl PopulationCounts {
    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }

    pub fn of(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    pub count: usize,
    pub mean_age: f64,
    pub mean_weight: f64,
    pub mean_fitness: f64,
}

impl SpeciesStats {
    pub fn collect<'a>(animals: impl IntoIterator<Item = &'a Animal>, params: &SpeciesParams) -> Self {
        let mut stats = SpeciesStats::default();
        let (mut age, mut weight, mut fitness) = (0.0, 0.0, 0.0);
        for animal in animals {
            stats.count += 1;
            age += animal.age() as f64;
            weight += animal.weight();
            fitness += animal.fitness(params);
        }
        if stats.count > 0 {
            let n = stats.count as f64;
            stats.mean_age = age / n;
            stats.mean_weight = weight / n;
            stats.mean_fitness = fitness / n;
        }
        stats
    }
}

/// What happened during one simulated year, measured after its last phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u64,
    pub herbivores: usize,
    pub carnivores: usize,
    pub herbivore_stats: SpeciesStats,
    pub carnivore_stats: SpeciesStats,
    pub births: SpeciesTally,
    pub deaths: SpeciesTally,
    pub migrants: SpeciesTally,
    pub herbivores_killed: usize,
    pub fodder_eaten: f64,
}
