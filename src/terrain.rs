//! Terrain types and the immutable map the island is built on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Water,
    Highland,
    Lowland,
    Desert,
}

impl TerrainType {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'W' => Some(TerrainType::Water),
            'H' => Some(TerrainType::Highland),
            'L' => Some(TerrainType::Lowland),
            'D' => Some(TerrainType::Desert),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            TerrainType::Water => 'W',
            TerrainType::Highland => 'H',
            TerrainType::Lowland => 'L',
            TerrainType::Desert => 'D',
        }
    }

    pub fn is_passable(self) -> bool {
        self != TerrainType::Water
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Row-major terrain map. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainGrid {
    rows: usize,
    cols: usize,
    tiles: Vec<TerrainType>,
}

impl TerrainGrid {
    /// Parses a block of terrain symbols, one line per row.
    ///
    /// Surrounding whitespace on each line and blank lines are ignored. The grid
    /// must be rectangular and every border cell must be water.
    pub fn parse(map: &str) -> Result<Self, ConfigError> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(ConfigError::EmptyMap);
        };

        let cols = first.chars().count();
        let mut tiles = Vec::with_capacity(lines.len() * cols);
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(ConfigError::RaggedMap {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let terrain = TerrainType::from_symbol(symbol).ok_or(ConfigError::UnknownTerrain {
                    symbol,
                    at: Coordinate::new(row, col),
                })?;
                tiles.push(terrain);
            }
        }

        let grid = Self {
            rows: lines.len(),
            cols,
            tiles,
        };
        grid.check_border()?;
        Ok(grid)
    }

    fn check_border(&self) -> Result<(), ConfigError> {
        for at in self.coordinates() {
            let on_border =
                at.row == 0 || at.col == 0 || at.row + 1 == self.rows || at.col + 1 == self.cols;
            if on_border && self.terrain(at) != Some(TerrainType::Water) {
                return Err(ConfigError::BorderNotWater { at });
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    pub fn index_of(&self, at: Coordinate) -> Option<usize> {
        self.contains(at).then(|| at.row * self.cols + at.col)
    }

    pub fn coordinate_of(&self, index: usize) -> Coordinate {
        Coordinate::new(index / self.cols, index % self.cols)
    }

    pub fn terrain(&self, at: Coordinate) -> Option<TerrainType> {
        self.index_of(at).map(|index| self.tiles[index])
    }

    /// Every coordinate in row-major order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.tiles.len()).map(move |index| self.coordinate_of(index))
    }

    /// 4-connected neighbours that animals can enter, in north, east, south, west order.
    pub fn passable_neighbours(&self, at: Coordinate) -> Vec<Coordinate> {
        let mut neighbours = Vec::with_capacity(4);
        if at.row > 0 {
            neighbours.push(Coordinate::new(at.row - 1, at.col));
        }
        neighbours.push(Coordinate::new(at.row, at.col + 1));
        neighbours.push(Coordinate::new(at.row + 1, at.col));
        if at.col > 0 {
            neighbours.push(Coordinate::new(at.row, at.col - 1));
        }
        neighbours.retain(|&n| {
            self.terrain(n)
                .map(TerrainType::is_passable)
                .unwrap_or(false)
        });
        neighbours
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in self.tiles.chunks(self.cols) {
            out.extend(row.iter().map(|t| t.symbol()));
            out.push('\n');
        }
        out
    }
}
