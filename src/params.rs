//! Species and landscape parameters.
//!
//! Every biological constant is data: one `SpeciesParams` table per species plus
//! the fodder caps. Scenario files may override any subset of them.

use serde::{Deserialize, Serialize};

use crate::animal::Species;
use crate::error::ConfigError;
use crate::terrain::TerrainType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean newborn weight.
    pub birth_weight_mean: f64,
    /// Standard deviation of newborn weight.
    pub birth_weight_sd: f64,
    /// Weight gained per unit of food eaten.
    pub weight_gain_factor: f64,
    /// Fraction of weight lost every year.
    pub weight_loss_rate: f64,
    pub age_half: f64,
    pub age_steepness: f64,
    pub weight_half: f64,
    pub weight_steepness: f64,
    /// Migration probability per unit of fitness.
    pub migration_scale: f64,
    /// Birth probability per unit of fitness and per other resident.
    pub birth_scale: f64,
    /// Mothers need `birth_threshold_factor * (birth_weight_mean + birth_weight_sd)`.
    pub birth_threshold_factor: f64,
    /// Mother loses this multiple of the newborn's weight.
    pub birth_cost_factor: f64,
    /// Death probability at zero fitness.
    pub death_scale: f64,
    /// Food eaten per year at most.
    pub appetite: f64,
    /// Fitness advantage at which a predator always kills.
    pub kill_fitness_span: f64,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            birth_weight_mean: 8.0,
            birth_weight_sd: 1.5,
            weight_gain_factor: 0.9,
            weight_loss_rate: 0.05,
            age_half: 40.0,
            age_steepness: 0.6,
            weight_half: 10.0,
            weight_steepness: 0.1,
            migration_scale: 0.25,
            birth_scale: 0.2,
            birth_threshold_factor: 3.5,
            birth_cost_factor: 1.2,
            death_scale: 0.4,
            appetite: 10.0,
            kill_fitness_span: 10.0,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            birth_weight_mean: 6.0,
            birth_weight_sd: 1.0,
            weight_gain_factor: 0.75,
            weight_loss_rate: 0.125,
            age_half: 40.0,
            age_steepness: 0.3,
            weight_half: 4.0,
            weight_steepness: 0.4,
            migration_scale: 0.4,
            birth_scale: 0.8,
            birth_threshold_factor: 3.5,
            birth_cost_factor: 1.1,
            death_scale: 0.8,
            appetite: 50.0,
            kill_fitness_span: 10.0,
        }
    }

    pub fn defaults_for(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    /// The value behind a parameter's scenario-file key.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        let field = match name {
            "birth_weight_mean" => &mut self.birth_weight_mean,
            "birth_weight_sd" => &mut self.birth_weight_sd,
            "weight_gain_factor" => &mut self.weight_gain_factor,
            "weight_loss_rate" => &mut self.weight_loss_rate,
            "age_half" => &mut self.age_half,
            "age_steepness" => &mut self.age_steepness,
            "weight_half" => &mut self.weight_half,
            "weight_steepness" => &mut self.weight_steepness,
            "migration_scale" => &mut self.migration_scale,
            "birth_scale" => &mut self.birth_scale,
            "birth_threshold_factor" => &mut self.birth_threshold_factor,
            "birth_cost_factor" => &mut self.birth_cost_factor,
            "death_scale" => &mut self.death_scale,
            "appetite" => &mut self.appetite,
            "kill_fitness_span" => &mut self.kill_fitness_span,
            _ => return None,
        };
        Some(field)
    }

    /// Weight a mother needs before she can give birth.
    pub fn birth_threshold(&self) -> f64 {
        self.birth_threshold_factor * (self.birth_weight_mean + self.birth_weight_sd)
    }

    pub fn validate(&self, scope: &'static str) -> Result<(), ConfigError> {
        positive(scope, "appetite", self.appetite)?;
        positive(scope, "weight_gain_factor", self.weight_gain_factor)?;
        positive(scope, "birth_weight_mean", self.birth_weight_mean)?;
        positive(scope, "kill_fitness_span", self.kill_fitness_span)?;
        non_negative(scope, "birth_weight_sd", self.birth_weight_sd)?;
        non_negative(scope, "age_half", self.age_half)?;
        non_negative(scope, "age_steepness", self.age_steepness)?;
        non_negative(scope, "weight_half", self.weight_half)?;
        non_negative(scope, "weight_steepness", self.weight_steepness)?;
        non_negative(scope, "birth_scale", self.birth_scale)?;
        non_negative(scope, "birth_threshold_factor", self.birth_threshold_factor)?;
        non_negative(scope, "birth_cost_factor", self.birth_cost_factor)?;
        probability(scope, "weight_loss_rate", self.weight_loss_rate)?;
        probability(scope, "migration_scale", self.migration_scale)?;
        probability(scope, "death_scale", self.death_scale)?;
        Ok(())
    }
}

/// Annual fodder cap per terrain. Desert and water never carry fodder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FodderParams {
    pub lowland: f64,
    pub highland: f64,
}

impl Default for FodderParams {
    fn default() -> Self {
        Self {
            lowland: 800.0,
            highland: 300.0,
        }
    }
}

impl FodderParams {
    pub fn max_for(&self, terrain: TerrainType) -> f64 {
        match terrain {
            TerrainType::Lowland => self.lowland,
            TerrainType::Highland => self.highland,
            TerrainType::Desert | TerrainType::Water => 0.0,
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "lowland" => Some(&mut self.lowland),
            "highland" => Some(&mut self.highland),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("fodder", "lowland", self.lowland)?;
        non_negative("fodder", "highland", self.highland)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub fodder: FodderParams,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            fodder: FodderParams::default(),
        }
    }
}

impl Parameters {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.herbivore.validate("herbivore")?;
        self.carnivore.validate("carnivore")?;
        self.fodder.validate()
    }

    /// Restores one species parameter, named by its scenario-file key, to its default.
    pub fn reset_species_parameter(&mut self, species: Species, name: &str) -> Result<(), ConfigError> {
        let default = SpeciesParams::defaults_for(species)
            .field_mut(name)
            .map(|value| *value);
        match (self.species_mut(species).field_mut(name), default) {
            (Some(slot), Some(default)) => {
                *slot = default;
                Ok(())
            }
            _ => Err(ConfigError::UnknownParameter {
                scope: species.name(),
                name: name.to_owned(),
            }),
        }
    }

    pub fn reset_fodder_parameter(&mut self, name: &str) -> Result<(), ConfigError> {
        let default = FodderParams::default().field_mut(name).map(|value| *value);
        match (self.fodder.field_mut(name), default) {
            (Some(slot), Some(default)) => {
                *slot = default;
                Ok(())
            }
            _ => Err(ConfigError::UnknownParameter {
                scope: "fodder",
                name: name.to_owned(),
            }),
        }
    }

    /// Applies overrides on top of the current values and validates the result.
    /// On failure `self` is left untouched.
    pub fn apply(&mut self, overrides: &ParameterOverrides) -> Result<(), ConfigError> {
        let mut next = self.clone();
        if let Some(herbivore) = &overrides.herbivore {
            herbivore.apply_to(&mut next.herbivore);
        }
        if let Some(carnivore) = &overrides.carnivore {
            carnivore.apply_to(&mut next.carnivore);
        }
        if let Some(fodder) = &overrides.fodder {
            fodder.apply_to(&mut next.fodder);
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterOverrides {
    #[serde(default)]
    pub herbivore: Option<SpeciesOverrides>,
    #[serde(default)]
    pub carnivore: Option<SpeciesOverrides>,
    #[serde(default)]
    pub fodder: Option<FodderOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeciesOverrides {
    pub birth_weight_mean: Option<f64>,
    pub birth_weight_sd: Option<f64>,
    pub weight_gain_factor: Option<f64>,
    pub weight_loss_rate: Option<f64>,
    pub age_half: Option<f64>,
    pub age_steepness: Option<f64>,
    pub weight_half: Option<f64>,
    pub weight_steepness: Option<f64>,
    pub migration_scale: Option<f64>,
    pub birth_scale: Option<f64>,
    pub birth_threshold_factor: Option<f64>,
    pub birth_cost_factor: Option<f64>,
    pub death_scale: Option<f64>,
    pub appetite: Option<f64>,
    pub kill_fitness_span: Option<f64>,
}

impl SpeciesOverrides {
    fn apply_to(&self, params: &mut SpeciesParams) {
        let fields: [(Option<f64>, &mut f64); 15] = [
            (self.birth_weight_mean, &mut params.birth_weight_mean),
            (self.birth_weight_sd, &mut params.birth_weight_sd),
            (self.weight_gain_factor, &mut params.weight_gain_factor),
            (self.weight_loss_rate, &mut params.weight_loss_rate),
            (self.age_half, &mut params.age_half),
            (self.age_steepness, &mut params.age_steepness),
            (self.weight_half, &mut params.weight_half),
            (self.weight_steepness, &mut params.weight_steepness),
            (self.migration_scale, &mut params.migration_scale),
            (self.birth_scale, &mut params.birth_scale),
            (self.birth_threshold_factor, &mut params.birth_threshold_factor),
            (self.birth_cost_factor, &mut params.birth_cost_factor),
            (self.death_scale, &mut params.death_scale),
            (self.appetite, &mut params.appetite),
            (self.kill_fitness_span, &mut params.kill_fitness_span),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FodderOverrides {
    pub lowland: Option<f64>,
    pub highland: Option<f64>,
}

impl FodderOverrides {
    fn apply_to(&self, fodder: &mut FodderParams) {
        if let Some(lowland) = self.lowland {
            fodder.lowland = lowland;
        }
        if let Some(highland) = self.highland {
            fodder.highland = highland;
        }
    }
}

fn invalid(scope: &'static str, name: &'static str, value: f64, reason: &'static str) -> ConfigError {
    ConfigError::InvalidParameter {
        scope,
        name,
        value,
        reason,
    }
}

fn positive(scope: &'static str, name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(scope, name, value, "must be positive"))
    }
}

fn non_negative(scope: &'static str, name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(scope, name, value, "must be non-negative"))
    }
}

fn probability(scope: &'static str, name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(scope, name, value, "must lie in [0, 1]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Parameters::default().validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_appetite() {
        let mut params = Parameters::default();
        params.carnivore.appetite = 0.0;
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                scope: "carnivore",
                name: "appetite",
                ..
            }
        ));
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let mut params = Parameters::default();
        params.herbivore.death_scale = 1.5;
        assert!(params.validate().is_err());
        params.herbivore.death_scale = 0.4;
        params.herbivore.migration_scale = -0.1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn overrides_touch_only_named_fields() {
        let overrides: ParameterOverrides = serde_yaml::from_str(
            "herbivore:\n  appetite: 20\nfodder:\n  lowland: 0\n",
        )
        .unwrap();
        let mut params = Parameters::default();
        params.apply(&overrides).unwrap();
        assert_eq!(params.herbivore.appetite, 20.0);
        assert_eq!(params.herbivore.weight_gain_factor, 0.9);
        assert_eq!(params.fodder.lowland, 0.0);
        assert_eq!(params.fodder.highland, 300.0);
        assert_eq!(params.carnivore, SpeciesParams::carnivore());
    }

    #[test]
    fn invalid_override_leaves_parameters_untouched() {
        let overrides = ParameterOverrides {
            herbivore: Some(SpeciesOverrides {
                weight_gain_factor: Some(-1.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut params = Parameters::default();
        assert!(params.apply(&overrides).is_err());
        assert_eq!(params, Parameters::default());
    }

    #[test]
    fn unknown_override_keys_are_rejected() {
        let parsed: Result<ParameterOverrides, _> =
            serde_yaml::from_str("herbivore:\n  apetite: 20\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn reset_restores_one_named_parameter() {
        let mut params = Parameters::default();
        params.carnivore.appetite = 80.0;
        params.carnivore.death_scale = 0.1;
        params.reset_species_parameter(Species::Carnivore, "appetite").unwrap();
        assert_eq!(params.carnivore.appetite, 50.0);
        assert_eq!(params.carnivore.death_scale, 0.1);

        params.fodder.highland = 5.0;
        params.reset_fodder_parameter("highland").unwrap();
        assert_eq!(params.fodder.highland, 300.0);
    }

    #[test]
    fn reset_rejects_unknown_names() {
        let mut params = Parameters::default();
        let err = params
            .reset_species_parameter(Species::Herbivore, "stride")
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownParameter {
                scope: "herbivore",
                name: "stride".into()
            }
        );
        assert!(params.reset_fodder_parameter("desert").is_err());
        assert_eq!(params, Parameters::default());
    }

    #[test]
    fn every_override_key_can_be_reset() {
        let mut params = SpeciesParams::herbivore();
        for name in [
            "birth_weight_mean",
            "birth_weight_sd",
            "weight_gain_factor",
            "weight_loss_rate",
            "age_half",
            "age_steepness",
            "weight_half",
            "weight_steepness",
            "migration_scale",
            "birth_scale",
            "birth_threshold_factor",
            "birth_cost_factor",
            "death_scale",
            "appetite",
            "kill_fitness_span",
        ] {
            assert!(params.field_mut(name).is_some(), "{name}");
        }
    }

    #[test]
    fn fodder_caps_by_terrain() {
        let fodder = FodderParams::default();
        assert_eq!(fodder.max_for(TerrainType::Lowland), 800.0);
        assert_eq!(fodder.max_for(TerrainType::Highland), 300.0);
        assert_eq!(fodder.max_for(TerrainType::Desert), 0.0);
        assert_eq!(fodder.max_for(TerrainType::Water), 0.0);
    }
}
