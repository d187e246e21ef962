//! Per-animal biological state and the formulas that drive it.

use std::f64::consts::PI;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::params::SpeciesParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    pub fn name(self) -> &'static str {
        match self {
            Species::Herbivore => "herbivore",
            Species::Carnivore => "carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    newborn: bool,
}

impl Animal {
    /// An adult placed by seeding. Negative or non-finite weights are clamped to zero.
    pub fn new(species: Species, age: u32, weight: f64) -> Self {
        Self {
            species,
            age,
            weight: sanitize(weight),
            newborn: false,
        }
    }

    fn newborn(species: Species, weight: f64) -> Self {
        Self {
            species,
            age: 0,
            weight: sanitize(weight),
            newborn: true,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// True between birth and the first `age_one_year`.
    pub fn is_newborn(&self) -> bool {
        self.newborn
    }

    pub fn fitness(&self, params: &SpeciesParams) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        let age_factor = logistic(1.0, self.age as f64, params.age_half, params.age_steepness);
        let weight_factor = logistic(
            -1.0,
            self.weight,
            params.weight_half,
            params.weight_steepness,
        );
        (age_factor * weight_factor).clamp(0.0, 1.0)
    }

    pub fn gain_weight(&mut self, amount_eaten: f64, params: &SpeciesParams) {
        self.weight = sanitize(self.weight + params.weight_gain_factor * amount_eaten.max(0.0));
    }

    pub fn lose_weight_annual(&mut self, params: &SpeciesParams) {
        self.weight = sanitize(self.weight - params.weight_loss_rate * self.weight);
    }

    /// Also clears the newborn mark.
    pub fn age_one_year(&mut self) {
        self.age = self.age.saturating_add(1);
        self.newborn = false;
    }

    /// Draws a newborn weight: log-normal with the configured mean and spread.
    pub fn birth_weight<R: Rng + ?Sized>(params: &SpeciesParams, rng: &mut R) -> f64 {
        let mean = params.birth_weight_mean;
        let sd = params.birth_weight_sd;
        if sd <= 0.0 {
            return mean;
        }
        let variance_ratio = (sd * sd) / (mean * mean);
        let sigma = (1.0 + variance_ratio).ln().sqrt();
        let mu = mean.ln() - 0.5 * sigma * sigma;
        // Box-Muller
        let u1: f64 = rng.gen::<f64>().max(f64::EPSILON);
        let u2: f64 = rng.gen::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        (mu + sigma * z).exp()
    }

    /// Probability of giving birth this year with `residents` animals of the
    /// same species in the cell (including this one).
    pub fn birth_probability(&self, residents: usize, params: &SpeciesParams) -> f64 {
        if residents < 2 || self.weight < params.birth_threshold() {
            return 0.0;
        }
        (params.birth_scale * self.fitness(params) * (residents - 1) as f64).min(1.0)
    }

    /// Rolls for a birth and, on success, pays the birth cost and returns the newborn.
    /// The birth is vetoed when the cost exceeds the mother's weight.
    pub fn try_give_birth<R: Rng + ?Sized>(
        &mut self,
        residents: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        let probability = self.birth_probability(residents, params);
        if probability <= 0.0 || rng.gen::<f64>() >= probability {
            return None;
        }
        let child_weight = Self::birth_weight(params, rng);
        let cost = params.birth_cost_factor * child_weight;
        if child_weight <= 0.0 || cost > self.weight {
            return None;
        }
        self.weight = sanitize(self.weight - cost);
        Some(Animal::newborn(self.species, child_weight))
    }

    /// Probability of dying from causes other than starvation.
    pub fn death_probability(&self, params: &SpeciesParams) -> f64 {
        (params.death_scale * (1.0 - self.fitness(params))).clamp(0.0, 1.0)
    }

    /// Starvation is certain death; otherwise rolls against `death_probability`.
    pub fn dies<R: Rng + ?Sized>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        rng.gen::<f64>() < self.death_probability(params)
    }

    pub fn migration_probability(&self, params: &SpeciesParams) -> f64 {
        (params.migration_scale * self.fitness(params)).clamp(0.0, 1.0)
    }
}

/// Chance that a predator with `predator_fitness` kills prey with `prey_fitness`.
pub fn kill_probability(predator_fitness: f64, prey_fitness: f64, params: &SpeciesParams) -> f64 {
    let advantage = predator_fitness - prey_fitness;
    if advantage <= 0.0 {
        0.0
    } else if advantage < params.kill_fitness_span {
        advantage / params.kill_fitness_span
    } else {
        1.0
    }
}

fn logistic(sign: f64, x: f64, half: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (sign * steepness * (x - half)).exp())
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(0.0)
    } else {
        0.0
    }
}
