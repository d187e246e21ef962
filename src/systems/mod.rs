//! The annual phases, one `System` each, in the order the engine runs them.

mod aging;
mod feeding;
mod migration;
mod procreation;

pub use aging::AgingSystem;
pub use feeding::FeedingSystem;
pub use migration::MigrationSystem;
pub use procreation::ProcreationSystem;

use crate::cell::SpeciesTally;

/// Tallies the phases record while a year is running.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearLedger {
    pub fodder_eaten: f64,
    pub herbivores_killed: usize,
    pub births: SpeciesTally,
    pub migrants: SpeciesTally,
    pub deaths: SpeciesTally,
}
