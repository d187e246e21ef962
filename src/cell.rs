//! A single grid cell: its fodder and the animals living there.
//!
//! Residents are kept in insertion order. That order breaks fitness ties during
//! feeding, so identical seeds give identical years.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animal::{kill_probability, Animal, Species};
use crate::error::ConfigError;
use crate::params::{Parameters, SpeciesParams};
use crate::terrain::TerrainType;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedingReport {
    pub fodder_eaten: f64,
    pub herbivores_killed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesTally {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl SpeciesTally {
    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }

    pub fn add(&mut self, other: SpeciesTally) {
        self.herbivores += other.herbivores;
        self.carnivores += other.carnivores;
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    terrain: TerrainType,
    fodder: f64,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(terrain: TerrainType) -> Self {
        Self {
            terrain,
            fodder: 0.0,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn terrain(&self) -> TerrainType {
        self.terrain
    }

    pub fn fodder(&self) -> f64 {
        self.fodder
    }

    pub fn residents(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    fn residents_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    /// (herbivores, carnivores)
    pub fn population_counts(&self) -> (usize, usize) {
        (self.herbivores.len(), self.carnivores.len())
    }

    pub fn is_empty(&self) -> bool {
        self.herbivores.is_empty() && self.carnivores.is_empty()
    }

    pub fn add_animal(&mut self, animal: Animal) -> Result<(), ConfigError> {
        if !self.terrain.is_passable() {
            return Err(ConfigError::InvalidAnimal(format!(
                "{} cannot live in water",
                animal.species()
            )));
        }
        self.residents_mut(animal.species()).push(animal);
        Ok(())
    }

    /// Removes the first resident equal to `animal`.
    pub fn remove_animal(&mut self, animal: &Animal) -> Option<Animal> {
        let residents = self.residents_mut(animal.species());
        let position = residents.iter().position(|resident| resident == animal)?;
        Some(residents.remove(position))
    }

    pub fn clear(&mut self) -> SpeciesTally {
        let removed = SpeciesTally {
            herbivores: self.herbivores.len(),
            carnivores: self.carnivores.len(),
        };
        self.herbivores.clear();
        self.carnivores.clear();
        removed
    }

    pub fn reset_fodder(&mut self, params: &Parameters) {
        self.fodder = params.fodder.max_for(self.terrain);
    }

    /// Herbivores graze, fittest first, then carnivores hunt, fittest first,
    /// each trying the weakest remaining prey first.
    pub fn feed<R: Rng + ?Sized>(&mut self, params: &Parameters, rng: &mut R) -> FeedingReport {
        let mut report = FeedingReport::default();
        let herbivore = &params.herbivore;
        for index in order_by_fitness(&self.herbivores, herbivore, Ordering::Greater) {
            if self.fodder <= 0.0 {
                break;
            }
            let eaten = herbivore.appetite.min(self.fodder);
            self.fodder -= eaten;
            self.herbivores[index].gain_weight(eaten, herbivore);
            report.fodder_eaten += eaten;
        }

        if self.carnivores.is_empty() || self.herbivores.is_empty() {
            return report;
        }

        let carnivore = &params.carnivore;
        let prey_fitness: Vec<f64> = self
            .herbivores
            .iter()
            .map(|h| h.fitness(herbivore))
            .collect();
        let prey_order = order_by_fitness(&self.herbivores, herbivore, Ordering::Less);
        let mut alive = vec![true; self.herbivores.len()];

        for hunter in order_by_fitness(&self.carnivores, carnivore, Ordering::Greater) {
            let mut eaten = 0.0;
            for &prey in &prey_order {
                if eaten >= carnivore.appetite {
                    break;
                }
                if !alive[prey] {
                    continue;
                }
                let predator_fitness = self.carnivores[hunter].fitness(carnivore);
                let p = kill_probability(predator_fitness, prey_fitness[prey], carnivore);
                if p <= 0.0 || rng.gen::<f64>() >= p {
                    continue;
                }
                alive[prey] = false;
                report.herbivores_killed += 1;
                let meal = self.herbivores[prey].weight().min(carnivore.appetite - eaten);
                eaten += meal;
                self.carnivores[hunter].gain_weight(meal, carnivore);
            }
        }

        if report.herbivores_killed > 0 {
            let mut flags = alive.into_iter();
            self.herbivores.retain(|_| flags.next().unwrap_or(false));
        }
        report
    }

    /// Births for both species. Only animals present before the call can breed.
    pub fn procreate<R: Rng + ?Sized>(&mut self, params: &Parameters, rng: &mut R) -> SpeciesTally {
        SpeciesTally {
            herbivores: breed(&mut self.herbivores, params.species(Species::Herbivore), rng),
            carnivores: breed(&mut self.carnivores, params.species(Species::Carnivore), rng),
        }
    }

    /// Weight loss, aging, then death. Returns the number of deaths.
    pub fn annual_biology<R: Rng + ?Sized>(
        &mut self,
        params: &Parameters,
        rng: &mut R,
    ) -> SpeciesTally {
        let mut deaths = SpeciesTally::default();
        for species in Species::ALL {
            let species_params = params.species(species);
            let residents = self.residents_mut(species);
            for animal in residents.iter_mut() {
                animal.lose_weight_annual(species_params);
                animal.age_one_year();
            }
            let before = residents.len();
            residents.retain(|animal| !animal.dies(species_params, rng));
            let died = before - residents.len();
            match species {
                Species::Herbivore => deaths.herbivores = died,
                Species::Carnivore => deaths.carnivores = died,
            }
        }
        deaths
    }

    /// Removes and returns the residents for which `moves` is true. Stayers keep
    /// their relative order.
    pub(crate) fn take_where<F>(&mut self, species: Species, mut moves: F) -> Vec<Animal>
    where
        F: FnMut(&Animal) -> bool,
    {
        let residents = std::mem::take(self.residents_mut(species));
        let (leaving, staying): (Vec<Animal>, Vec<Animal>) =
            residents.into_iter().partition(|animal| moves(animal));
        *self.residents_mut(species) = staying;
        leaving
    }

    pub(crate) fn receive(&mut self, animal: Animal) {
        self.residents_mut(animal.species()).push(animal);
    }
}

fn breed<R: Rng + ?Sized>(
    residents: &mut Vec<Animal>,
    params: &SpeciesParams,
    rng: &mut R,
) -> usize {
    let count = residents.len();
    if count < 2 {
        return 0;
    }
    let newborns: Vec<Animal> = residents
        .iter_mut()
        .filter_map(|mother| mother.try_give_birth(count, params, rng))
        .collect();
    let born = newborns.len();
    residents.extend(newborns);
    born
}

/// Indices sorted by fitness; `Greater` puts the fittest first. The sort is
/// stable, so ties keep insertion order.
fn order_by_fitness(
    animals: &[Animal],
    params: &SpeciesParams,
    first: Ordering,
) -> Vec<usize> {
    let fitness: Vec<f64> = animals.iter().map(|a| a.fitness(params)).collect();
    let mut order: Vec<usize> = (0..animals.len()).collect();
    order.sort_by(|&a, &b| {
        let ord = fitness[a].total_cmp(&fitness[b]);
        if first == Ordering::Greater {
            ord.reverse()
        } else {
            ord
        }
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn lowland_with(herbivores: &[(u32, f64)], carnivores: &[(u32, f64)]) -> Cell {
        let mut cell = Cell::new(TerrainType::Lowland);
        for &(age, weight) in herbivores {
            cell.add_animal(Animal::new(Species::Herbivore, age, weight)).unwrap();
        }
        for &(age, weight) in carnivores {
            cell.add_animal(Animal::new(Species::Carnivore, age, weight)).unwrap();
        }
        cell
    }

    #[test]
    fn water_rejects_animals() {
        let mut cell = Cell::new(TerrainType::Water);
        assert!(cell.add_animal(Animal::new(Species::Herbivore, 1, 10.0)).is_err());
        assert_eq!(cell.population_counts(), (0, 0));
    }

    #[test]
    fn add_and_remove_by_species() {
        let mut cell = lowland_with(&[(1, 10.0), (2, 12.0)], &[(3, 8.0)]);
        assert_eq!(cell.population_counts(), (2, 1));
        let removed = cell.remove_animal(&Animal::new(Species::Herbivore, 2, 12.0));
        assert!(removed.is_some());
        assert_eq!(cell.population_counts(), (1, 1));
        assert!(cell
            .remove_animal(&Animal::new(Species::Carnivore, 9, 9.0))
            .is_none());
    }

    #[test]
    fn fodder_resets_to_terrain_cap() {
        let params = Parameters::default();
        let mut lowland = Cell::new(TerrainType::Lowland);
        let mut desert = Cell::new(TerrainType::Desert);
        lowland.reset_fodder(&params);
        desert.reset_fodder(&params);
        assert_eq!(lowland.fodder(), 800.0);
        assert_eq!(desert.fodder(), 0.0);
    }

    #[test]
    fn fittest_herbivore_eats_first() {
        let mut params = Parameters::default();
        params.fodder.lowland = 15.0;
        let mut cell = lowland_with(&[(5, 5.0), (5, 30.0)], &[]);
        cell.reset_fodder(&params);
        let report = cell.feed(&params, &mut rng());
        assert_eq!(report.fodder_eaten, 15.0);
        assert_eq!(cell.fodder(), 0.0);
        let herbivores = cell.residents(Species::Herbivore);
        assert!((herbivores[1].weight() - 39.0).abs() < 1e-12);
        assert!((herbivores[0].weight() - 9.5).abs() < 1e-12);
    }

    #[test]
    fn fitness_ties_keep_insertion_order() {
        let mut params = Parameters::default();
        params.fodder.lowland = 10.0;
        let mut cell = lowland_with(&[(5, 20.0), (5, 20.0)], &[]);
        cell.reset_fodder(&params);
        cell.feed(&params, &mut rng());
        let herbivores = cell.residents(Species::Herbivore);
        assert!((herbivores[0].weight() - 29.0).abs() < 1e-12);
        assert_eq!(herbivores[1].weight(), 20.0);
    }

    #[test]
    fn no_fodder_means_no_weight_gain() {
        let params = Parameters::default();
        let mut cell = Cell::new(TerrainType::Desert);
        cell.add_animal(Animal::new(Species::Herbivore, 3, 20.0)).unwrap();
        cell.reset_fodder(&params);
        let report = cell.feed(&params, &mut rng());
        assert_eq!(report.fodder_eaten, 0.0);
        assert_eq!(cell.residents(Species::Herbivore)[0].weight(), 20.0);
    }

    #[test]
    fn dominant_carnivore_kills_weak_prey() {
        let mut params = Parameters::default();
        params.carnivore.kill_fitness_span = 0.01;
        params.fodder.lowland = 0.0;
        let mut cell = lowland_with(&[(90, 1.0), (90, 1.5)], &[(5, 40.0)]);
        cell.reset_fodder(&params);
        let report = cell.feed(&params, &mut rng());
        assert_eq!(report.herbivores_killed, 2);
        assert_eq!(cell.population_counts(), (0, 1));
        let hunter = &cell.residents(Species::Carnivore)[0];
        assert!((hunter.weight() - (40.0 + 0.75 * 2.5)).abs() < 1e-9);
    }

    #[test]
    fn weaker_carnivore_never_kills() {
        let params = Parameters::default();
        let mut cell = lowland_with(&[(5, 60.0)], &[(90, 1.0)]);
        cell.reset_fodder(&params);
        let report = cell.feed(&params, &mut rng());
        assert_eq!(report.herbivores_killed, 0);
        assert_eq!(cell.population_counts(), (1, 1));
    }

    #[test]
    fn carnivore_stops_when_sated() {
        let mut params = Parameters::default();
        params.carnivore.kill_fitness_span = 0.01;
        params.carnivore.appetite = 5.0;
        params.fodder.lowland = 0.0;
        let mut cell = lowland_with(&[(90, 4.0), (90, 4.0), (90, 4.0)], &[(5, 40.0)]);
        cell.reset_fodder(&params);
        let report = cell.feed(&params, &mut rng());
        assert_eq!(report.herbivores_killed, 2);
        assert_eq!(cell.population_counts(), (1, 1));
    }

    #[test]
    fn newborns_do_not_breed_in_their_birth_year() {
        let mut params = Parameters::default();
        params.herbivore.birth_scale = 1.0;
        params.herbivore.birth_threshold_factor = 0.0;
        params.herbivore.birth_cost_factor = 0.0;
        let mut cell = lowland_with(&[(5, 50.0), (5, 50.0), (5, 50.0), (5, 50.0)], &[]);
        let births = cell.procreate(&params, &mut rng());
        assert_eq!(births.herbivores, 4);
        assert_eq!(births.carnivores, 0);
        assert_eq!(cell.population_counts(), (8, 0));
        assert!(cell.residents(Species::Herbivore)[4..]
            .iter()
            .all(Animal::is_newborn));
    }

    #[test]
    fn single_animal_never_breeds() {
        let params = Parameters::default();
        let mut cell = lowland_with(&[(5, 80.0)], &[(5, 80.0)]);
        let births = cell.procreate(&params, &mut rng());
        assert_eq!(births.total(), 0);
    }

    #[test]
    fn starving_animals_die() {
        let mut params = Parameters::default();
        params.herbivore.weight_loss_rate = 1.0;
        let mut cell = lowland_with(&[(5, 10.0), (5, 30.0)], &[]);
        let deaths = cell.annual_biology(&params, &mut rng());
        assert_eq!(deaths.herbivores, 2);
        assert!(cell.is_empty());
    }

    #[test]
    fn annual_biology_ages_survivors() {
        let mut params = Parameters::default();
        params.herbivore.death_scale = 0.0;
        let mut cell = lowland_with(&[(5, 20.0)], &[]);
        cell.annual_biology(&params, &mut rng());
        let survivor = &cell.residents(Species::Herbivore)[0];
        assert_eq!(survivor.age(), 6);
        assert!((survivor.weight() - 19.0).abs() < 1e-12);
    }
}
