use anyhow::Result;
use tracing::debug;

use crate::{
    engine::{System, YearContext},
    island::Island,
    rng::PhaseRng,
    systems::YearLedger,
};

/// Weight loss, aging and death.
pub struct AgingSystem;

impl AgingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AgingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for AgingSystem {
    fn name(&self) -> &str {
        "aging"
    }

    fn run(
        &mut self,
        ctx: &YearContext,
        island: &mut Island,
        ledger: &mut YearLedger,
        rng: &mut PhaseRng,
    ) -> Result<()> {
        let deaths = island.annual_biology_update(rng);
        ledger.deaths.add(deaths);
        debug!(
            scenario = ctx.scenario_name,
            year = ctx.year,
            herbivores = deaths.herbivores,
            carnivores = deaths.carnivores,
            "deaths"
        );
        Ok(())
    }
}
