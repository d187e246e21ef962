//! Configuration errors raised while building or seeding an island.

use thiserror::Error;

use crate::terrain::Coordinate;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("map contains no rows")]
    EmptyMap,

    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown terrain symbol '{symbol}' at {at}")]
    UnknownTerrain { symbol: char, at: Coordinate },

    #[error("border cell {at} must be water")]
    BorderNotWater { at: Coordinate },

    #[error("coordinate {at} is outside the {rows}x{cols} island")]
    OutOfBounds {
        at: Coordinate,
        rows: usize,
        cols: usize,
    },

    #[error("animals cannot be placed in water at {at}")]
    WaterCell { at: Coordinate },

    #[error("invalid animal: {0}")]
    InvalidAnimal(String),

    #[error("unknown {scope} parameter '{name}'")]
    UnknownParameter { scope: &'static str, name: String },

    #[error("invalid parameter {scope}.{name} = {value}: {reason}")]
    InvalidParameter {
        scope: &'static str,
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}
