//! Wire records for maps and paths
//!
//! These shapes are what a client sees: a flat list of per-hex records for a
//! map, and an ordered list of segment records for a path.

use std::fs;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::grid::hex::HexCoord;
use crate::grid::map::{Grid, Hex};
use crate::grid::path::Path;
use crate::grid::position::OrientedPosition;
use crate::grid::terrain::Terrain;

/// One hex as exported for transport or persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexRecord {
    pub coordinate: HexCoord,
    #[serde(default)]
    pub terrain: Vec<Terrain>,
    #[serde(default)]
    pub level: i32,
}

impl From<&Hex> for HexRecord {
    fn from(hex: &Hex) -> Self {
        Self {
            coordinate: hex.coord,
            terrain: hex.terrain().to_vec(),
            level: hex.level,
        }
    }
}

impl From<HexRecord> for Hex {
    fn from(record: HexRecord) -> Self {
        record
            .terrain
            .into_iter()
            .fold(Hex::new(record.coordinate).with_level(record.level), Hex::with_terrain)
    }
}

/// One segment as exported for replay or logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub from: OrientedPosition,
    pub to: OrientedPosition,
    pub cost: u32,
    pub reversed: bool,
}

impl Path {
    pub fn export(&self) -> Vec<SegmentRecord> {
        self.segments()
            .iter()
            .map(|s| SegmentRecord {
                from: s.from,
                to: s.to,
                cost: s.cost,
                reversed: s.reversed,
            })
            .collect()
    }
}

impl Grid {
    /// All hexes as records, sorted by coordinate
    pub fn export(&self) -> Vec<HexRecord> {
        let mut records: Vec<HexRecord> = self.hexes().map(HexRecord::from).collect();
        records.sort_by_key(|r| r.coordinate);
        records
    }

    /// Rebuild a grid from exported records, with default engine settings
    pub fn from_records(
        width: u32,
        height: u32,
        records: impl IntoIterator<Item = HexRecord>,
    ) -> Result<Grid> {
        let records = records.into_iter();
        let mut grid = Grid::new(width, height);
        grid.reserve(records.size_hint().0);
        for record in records {
            grid.add_hex(record.into())?;
        }
        Ok(grid)
    }
}

/// A whole map document (JSON or TOML)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFile {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub hexes: Vec<HexRecord>,
}

impl MapFile {
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            hexes: grid.export(),
        }
    }

    /// Load a map; `.toml` files are read as TOML, anything else as JSON
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        tracing::debug!("Loading map from {:?}", path);

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        if is_toml {
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(serde_json::from_str(&contents)?)
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the grid this document describes
    pub fn into_grid(self, config: EngineConfig) -> Result<Grid> {
        let mut grid = Grid::with_config(self.width, self.height, config)?;
        grid.reserve(self.hexes.len());
        for record in self.hexes {
            grid.add_hex(record.into())?;
        }
        Ok(grid)
    }
}
