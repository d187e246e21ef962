pub mod animal;
pub mod cell;
pub mod engine;
pub mod error;
pub mod island;
pub mod params;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod terrain;

pub use animal::{Animal, Species};
pub use engine::{Simulation, SimulationSettings};
pub use error::ConfigError;
pub use island::Island;
pub use params::Parameters;
pub use scenario::{Scenario, ScenarioLoader};
pub use terrain::{Coordinate, TerrainType};
