use anyhow::Result;
use tracing::debug;

use crate::{
    engine::{System, YearContext},
    island::Island,
    rng::PhaseRng,
    systems::YearLedger,
};

pub struct MigrationSystem;

impl MigrationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MigrationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MigrationSystem {
    fn name(&self) -> &str {
        "migration"
    }

    fn run(
        &mut self,
        ctx: &YearContext,
        island: &mut Island,
        ledger: &mut YearLedger,
        rng: &mut PhaseRng,
    ) -> Result<()> {
        let migrants = island.migrate(rng);
        ledger.migrants.add(migrants);
        debug!(
            scenario = ctx.scenario_name,
            year = ctx.year,
            moved = migrants.total(),
            "migration"
        );
        Ok(())
    }
}
