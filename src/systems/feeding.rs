use anyhow::Result;
use tracing::debug;

use crate::{
    engine::{System, YearContext},
    island::Island,
    rng::PhaseRng,
    systems::YearLedger,
};

/// Fodder regrowth, grazing and predation.
pub struct FeedingSystem;

impl FeedingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FeedingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for FeedingSystem {
    fn name(&self) -> &str {
        "feeding"
    }

    fn run(
        &mut self,
        ctx: &YearContext,
        island: &mut Island,
        ledger: &mut YearLedger,
        rng: &mut PhaseRng,
    ) -> Result<()> {
        let report = island.feed(rng);
        ledger.fodder_eaten += report.fodder_eaten;
        ledger.herbivores_killed += report.herbivores_killed;
        debug!(
            scenario = ctx.scenario_name,
            year = ctx.year,
            fodder_eaten = report.fodder_eaten,
            killed = report.herbivores_killed,
            "feeding done"
        );
        Ok(())
    }
}
