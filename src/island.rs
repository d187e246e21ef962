//! The island: terrain grid, one cell per coordinate, and the species parameters.
//!
//! All population changes go through this type. Cells are mutated only by their
//! own phase calls and by the migration batch.

use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::animal::{Animal, Species};
use crate::cell::{Cell, FeedingReport, SpeciesTally};
use crate::error::ConfigError;
use crate::params::{ParameterOverrides, Parameters};
use crate::snapshot::{CellCounts, PopulationCounts, SpeciesStats};
use crate::terrain::{Coordinate, TerrainGrid, TerrainType};

/// One seeding entry: `count` identical animals at a coordinate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopulationSeed {
    pub row: usize,
    pub col: usize,
    pub animals: Vec<AnimalSeed>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalSeed {
    pub species: Species,
    #[serde(default)]
    pub age: u32,
    /// Drawn like a newborn's weight when omitted.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default = "default_seed_count")]
    pub count: usize,
}

fn default_seed_count() -> usize {
    1
}

impl PopulationSeed {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.row, self.col)
    }

    pub fn build_animals<R: Rng + ?Sized>(
        &self,
        params: &Parameters,
        rng: &mut R,
    ) -> Result<Vec<Animal>, ConfigError> {
        let mut animals = Vec::new();
        for seed in &self.animals {
            match seed.weight {
                Some(weight) if !weight.is_finite() || weight < 0.0 => {
                    return Err(ConfigError::InvalidAnimal(format!(
                        "{} at {} has weight {}",
                        seed.species,
                        self.coordinate(),
                        weight
                    )));
                }
                Some(weight) => animals.extend(
                    std::iter::repeat_with(|| Animal::new(seed.species, seed.age, weight))
                        .take(seed.count),
                ),
                None => {
                    let species = params.species(seed.species);
                    animals.extend((0..seed.count).map(|_| {
                        Animal::new(seed.species, seed.age, Animal::birth_weight(species, rng))
                    }));
                }
            }
        }
        Ok(animals)
    }
}

#[derive(Debug, Clone)]
pub struct Island {
    grid: TerrainGrid,
    cells: Vec<Cell>,
    params: Parameters,
}

impl Island {
    /// Parses the map and validates the parameters.
    pub fn build(map: &str, params: Parameters) -> Result<Self, ConfigError> {
        let grid = TerrainGrid::parse(map)?;
        Self::new(grid, params)
    }

    pub fn new(grid: TerrainGrid, params: Parameters) -> Result<Self, ConfigError> {
        params.validate()?;
        let cells = grid
            .coordinates()
            .map(|at| Cell::new(grid.terrain(at).unwrap_or(TerrainType::Water)))
            .collect();
        Ok(Self {
            grid,
            cells,
            params,
        })
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn update_parameters(&mut self, overrides: &ParameterOverrides) -> Result<(), ConfigError> {
        self.params.apply(overrides)
    }

    pub fn reset_species_parameter(&mut self, species: Species, name: &str) -> Result<(), ConfigError> {
        self.params.reset_species_parameter(species, name)
    }

    pub fn reset_fodder_parameter(&mut self, name: &str) -> Result<(), ConfigError> {
        self.params.reset_fodder_parameter(name)
    }

    /// Puts every species and fodder parameter back to its default.
    pub fn reset_parameters(&mut self) {
        self.params = Parameters::default();
        info!("parameters reset to defaults");
    }

    pub fn cell(&self, at: Coordinate) -> Option<&Cell> {
        self.grid.index_of(at).map(|index| &self.cells[index])
    }

    fn land_index(&self, at: Coordinate) -> Result<usize, ConfigError> {
        let index = self.grid.index_of(at).ok_or(ConfigError::OutOfBounds {
            at,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
        })?;
        if !self.cells[index].terrain().is_passable() {
            return Err(ConfigError::WaterCell { at });
        }
        Ok(index)
    }

    /// Places animals at `at`. Nothing is added unless the coordinate is valid land.
    pub fn add_population(&mut self, at: Coordinate, animals: Vec<Animal>) -> Result<(), ConfigError> {
        let index = self.land_index(at)?;
        let cell = &mut self.cells[index];
        for animal in animals {
            cell.add_animal(animal)?;
        }
        Ok(())
    }

    /// Applies a whole seeding list. Every entry is checked before any animal
    /// is placed, so a bad entry leaves the island unchanged. `rng` draws the
    /// weights of entries that leave them out.
    pub fn seed<R: Rng + ?Sized>(&mut self, seeds: &[PopulationSeed], rng: &mut R) -> Result<(), ConfigError> {
        let mut placements = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let at = seed.coordinate();
            self.land_index(at)?;
            placements.push((at, seed.build_animals(&self.params, rng)?));
        }
        let mut placed = 0;
        for (at, animals) in placements {
            placed += animals.len();
            self.add_population(at, animals)?;
        }
        info!(placed, entries = seeds.len(), "seeded island population");
        Ok(())
    }

    /// Removes every animal from the island. Returns how many were removed.
    pub fn clear_population(&mut self) -> SpeciesTally {
        let mut removed = SpeciesTally::default();
        for cell in &mut self.cells {
            removed.add(cell.clear());
        }
        info!(
            herbivores = removed.herbivores,
            carnivores = removed.carnivores,
            "population cleared"
        );
        removed
    }

    pub fn remove_animal(&mut self, at: Coordinate, animal: &Animal) -> Result<Option<Animal>, ConfigError> {
        let index = self.land_index(at)?;
        Ok(self.cells[index].remove_animal(animal))
    }

    /// Regrows fodder and runs feeding in every land cell.
    pub fn feed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FeedingReport {
        let mut total = FeedingReport::default();
        for cell in self.cells.iter_mut().filter(|c| c.terrain().is_passable()) {
            cell.reset_fodder(&self.params);
            let report = cell.feed(&self.params, rng);
            total.fodder_eaten += report.fodder_eaten;
            total.herbivores_killed += report.herbivores_killed;
        }
        total
    }

    pub fn procreate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SpeciesTally {
        let mut births = SpeciesTally::default();
        for cell in self.cells.iter_mut().filter(|c| !c.is_empty()) {
            births.add(cell.procreate(&self.params, rng));
        }
        births
    }

    /// Moves animals to neighbouring land.
    ///
    /// Every decision is drawn while the movers are held outside the grid, so no
    /// animal is evaluated twice and none moves more than one step. The moves are
    /// then applied in one batch. Newborns stay put in their birth year.
    pub fn migrate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SpeciesTally {
        let mut pending: Vec<(usize, Animal)> = Vec::new();
        let mut migrants = SpeciesTally::default();

        for index in 0..self.cells.len() {
            if self.cells[index].is_empty() {
                continue;
            }
            let neighbours = self.grid.passable_neighbours(self.grid.coordinate_of(index));
            if neighbours.is_empty() {
                continue;
            }
            for species in Species::ALL {
                let params = self.params.species(species);
                let mut targets = Vec::new();
                let leaving = self.cells[index].take_where(species, |animal| {
                    if animal.is_newborn() || rng.gen::<f64>() >= animal.migration_probability(params) {
                        return false;
                    }
                    targets.push(neighbours[rng.gen_range(0..neighbours.len())]);
                    true
                });
                match species {
                    Species::Herbivore => migrants.herbivores += leaving.len(),
                    Species::Carnivore => migrants.carnivores += leaving.len(),
                }
                for (animal, target) in leaving.into_iter().zip(targets) {
                    if let Some(target) = self.grid.index_of(target) {
                        pending.push((target, animal));
                    }
                }
            }
        }

        for (target, animal) in pending {
            self.cells[target].receive(animal);
        }
        migrants
    }

    /// Weight loss, aging and death in every cell. Runs after migration so that
    /// migration used pre-aging fitness.
    pub fn annual_biology_update<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SpeciesTally {
        let mut deaths = SpeciesTally::default();
        for cell in self.cells.iter_mut().filter(|c| !c.is_empty()) {
            deaths.add(cell.annual_biology(&self.params, rng));
        }
        deaths
    }

    /// (herbivores, carnivores) over the whole island.
    pub fn population_counts(&self) -> (usize, usize) {
        self.cells.iter().fold((0, 0), |(h, c), cell| {
            let (ch, cc) = cell.population_counts();
            (h + ch, c + cc)
        })
    }

    pub fn aggregate_counts(&self) -> PopulationCounts {
        let mut counts = PopulationCounts {
            herbivores: 0,
            carnivores: 0,
            cells: Vec::new(),
        };
        for (index, cell) in self.cells.iter().enumerate() {
            if !cell.terrain().is_passable() {
                continue;
            }
            let at = self.grid.coordinate_of(index);
            let (herbivores, carnivores) = cell.population_counts();
            counts.herbivores += herbivores;
            counts.carnivores += carnivores;
            counts.cells.push(CellCounts {
                row: at.row,
                col: at.col,
                terrain: cell.terrain(),
                fodder: cell.fodder(),
                herbivores,
                carnivores,
            });
        }
        counts
    }

    pub fn species_stats(&self, species: Species) -> SpeciesStats {
        SpeciesStats::collect(
            self.cells.iter().flat_map(|cell| cell.residents(species)),
            self.params.species(species),
        )
    }
}
