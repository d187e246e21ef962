use anyhow::Result;
use tracing::debug;

use crate::{
    engine::{System, YearContext},
    island::Island,
    rng::PhaseRng,
    systems::YearLedger,
};

pub struct ProcreationSystem;

impl ProcreationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProcreationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProcreationSystem {
    fn name(&self) -> &str {
        "procreation"
    }

    fn run(
        &mut self,
        ctx: &YearContext,
        island: &mut Island,
        ledger: &mut YearLedger,
        rng: &mut PhaseRng,
    ) -> Result<()> {
        let births = island.procreate(rng);
        ledger.births.add(births);
        debug!(
            scenario = ctx.scenario_name,
            year = ctx.year,
            herbivores = births.herbivores,
            carnivores = births.carnivores,
            "births"
        );
        Ok(())
    }
}
