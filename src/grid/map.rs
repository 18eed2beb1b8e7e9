//! Tactical map: hex cells, bounds, and the public query surface
//!
//! The grid owns its hexes and both result caches. Movement and sight
//! queries go through the grid, which checks the cache, runs the search,
//! and stores the result.

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::error::{HexError, Result};
use crate::grid::cache::GridCaches;
use crate::grid::constants::BASE_MOVEMENT_COST;
use crate::grid::hex::{HexCoord, HexCoordSet};
use crate::grid::path::{MovementMode, Path, PathKey};
use crate::grid::position::OrientedPosition;
use crate::grid::terrain::Terrain;
use crate::grid::{jump, pathfinding, reachability, visibility};

/// A single hex on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    pub coord: HexCoord,
    pub level: i32,
    terrain: Vec<Terrain>,
    /// Presentation only; ignored by every algorithm
    pub highlighted: bool,
}

impl Hex {
    pub fn new(coord: HexCoord) -> Self {
        Self {
            coord,
            level: 0,
            terrain: Vec::new(),
            highlighted: false,
        }
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn with_terrain(mut self, terrain: Terrain) -> Self {
        self.add_terrain(terrain);
        self
    }

    /// Terrain layers in insertion order
    pub fn terrain(&self) -> &[Terrain] {
        &self.terrain
    }

    pub fn has_terrain(&self, terrain: Terrain) -> bool {
        self.terrain.contains(&terrain)
    }

    /// Add a layer; a layer that is already present is not duplicated
    pub fn add_terrain(&mut self, terrain: Terrain) {
        if !self.terrain.contains(&terrain) {
            self.terrain.push(terrain);
        }
    }

    /// Remove a layer, returning whether it was present
    pub fn remove_terrain(&mut self, terrain: Terrain) -> bool {
        let before = self.terrain.len();
        self.terrain.retain(|t| *t != terrain);
        self.terrain.len() != before
    }

    /// Points to enter this hex: the most expensive layer, or 1 if bare
    pub fn movement_cost(&self) -> u32 {
        self.terrain
            .iter()
            .map(Terrain::movement_cost)
            .max()
            .unwrap_or(BASE_MOVEMENT_COST)
    }

    /// Level plus the tallest layer
    pub fn ceiling(&self) -> i32 {
        self.level + self.terrain.iter().map(Terrain::height).max().unwrap_or(0)
    }

    /// Sum of the sight obstruction of every layer
    pub fn intervening_factor(&self) -> u32 {
        self.terrain.iter().map(Terrain::intervening_factor).sum()
    }
}

/// The full tactical map
#[derive(Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    hexes: AHashMap<HexCoord, Hex>,
    config: EngineConfig,
    caches: GridCaches,
}

impl Clone for Grid {
    /// Clones start with empty caches
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            hexes: self.hexes.clone(),
            config: self.config.clone(),
            caches: GridCaches::default(),
        }
    }
}

impl Grid {
    /// Create an empty map with default engine settings
    pub fn new(width: u32, height: u32) -> Self {
        Self::build(width, height, EngineConfig::default())
    }

    /// Create an empty map, rejecting an invalid config
    pub fn with_config(width: u32, height: u32, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(width, height, config))
    }

    /// Storage grows with the hexes actually added, never with the bounds
    fn build(width: u32, height: u32, config: EngineConfig) -> Self {
        tracing::debug!("Creating {}x{} grid with {:?}", width, height, config);
        Self {
            width,
            height,
            hexes: AHashMap::new(),
            config,
            caches: GridCaches::default(),
        }
    }

    /// Make room for `additional` more hexes
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.hexes.reserve(additional);
    }

    /// Create a map with a flat, bare hex at every in-bounds coordinate
    pub fn filled(width: u32, height: u32) -> Self {
        let mut grid = Self::new(width, height);
        grid.reserve((width as usize).saturating_mul(height as usize));
        for q in 1..=width as i32 {
            for r in 1..=height as i32 {
                let coord = HexCoord::new(q, r);
                grid.hexes.insert(coord, Hex::new(coord));
            }
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of hexes actually stored
    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.values()
    }

    /// Insert or overwrite a hex. Coordinates outside the map are rejected,
    /// never clamped.
    pub fn add_hex(&mut self, hex: Hex) -> Result<()> {
        if !self.is_on_map(hex.coord) {
            return Err(HexError::OutOfBounds {
                coord: hex.coord,
                width: self.width,
                height: self.height,
            });
        }
        self.invalidate_caches();
        self.hexes.insert(hex.coord, hex);
        Ok(())
    }

    /// Get a hex at the given coordinate
    pub fn get_hex(&self, coord: HexCoord) -> Option<&Hex> {
        self.hexes.get(&coord)
    }

    /// Check if coordinate is within map bounds (whether or not a hex exists
    /// there)
    pub fn is_on_map(&self, coord: HexCoord) -> bool {
        coord.q >= 1
            && coord.r >= 1
            && i64::from(coord.q) <= i64::from(self.width)
            && i64::from(coord.r) <= i64::from(self.height)
    }

    /// Mutable access for terrain changes. Drops cached results first.
    fn hex_mut(&mut self, coord: HexCoord) -> Result<&mut Hex> {
        self.invalidate_caches();
        self.hexes.get_mut(&coord).ok_or(HexError::MissingHex(coord))
    }

    /// Add a terrain layer at a coordinate
    pub fn add_terrain(&mut self, coord: HexCoord, terrain: Terrain) -> Result<()> {
        self.hex_mut(coord)?.add_terrain(terrain);
        Ok(())
    }

    /// Remove a terrain layer (e.g. destroyed woods), returning whether it
    /// was present
    pub fn remove_terrain(&mut self, coord: HexCoord, terrain: Terrain) -> Result<bool> {
        Ok(self.hex_mut(coord)?.remove_terrain(terrain))
    }

    /// Set elevation at a coordinate
    pub fn set_level(&mut self, coord: HexCoord, level: i32) -> Result<()> {
        self.hex_mut(coord)?.level = level;
        Ok(())
    }

    pub fn set_highlighted(&mut self, coord: HexCoord, highlighted: bool) -> Result<()> {
        self.hex_mut(coord)?.highlighted = highlighted;
        Ok(())
    }

    /// Drop every cached path and sight line. Call once per game turn, after
    /// terrain changes.
    pub fn invalidate_caches(&self) {
        if !self.caches.is_empty() {
            tracing::debug!("Invalidating grid caches");
        }
        self.caches.clear();
    }

    /// Cheapest path from `start` to `target` within `budget` movement
    /// points, avoiding `prohibited` hexes. Jump mode uses the greedy jump
    /// search. `Ok(None)` means no path fits.
    pub fn find_path(
        &self,
        start: OrientedPosition,
        target: OrientedPosition,
        mode: MovementMode,
        budget: u32,
        prohibited: &HexCoordSet,
    ) -> Result<Option<Path>> {
        let key = PathKey::shortest(start, target, mode);
        self.cached_path(key, budget, prohibited, || {
            if mode.is_jump() {
                Ok(jump::find_jump_path(self, start, target, budget, prohibited))
            } else {
                pathfinding::find_shortest_path(self, start, target, mode, budget, prohibited)
            }
        })
    }

    /// Best-effort path covering as many distinct hexes as the budget
    /// allows. Never covers fewer hexes than [`Grid::find_path`] would.
    pub fn find_longest_path(
        &self,
        start: OrientedPosition,
        target: OrientedPosition,
        mode: MovementMode,
        budget: u32,
        prohibited: &HexCoordSet,
    ) -> Result<Option<Path>> {
        let key = PathKey::longest(start, target, mode, budget);
        self.cached_path(key, budget, prohibited, || {
            if mode.is_jump() {
                Ok(jump::find_jump_path(self, start, target, budget, prohibited))
            } else {
                pathfinding::find_longest_path(self, start, target, mode, budget, prohibited)
            }
        })
    }

    /// Cached paths are only valid for queries with no prohibited hexes. A
    /// cached path over budget counts as no path and stays cached.
    fn cached_path(
        &self,
        key: PathKey,
        budget: u32,
        prohibited: &HexCoordSet,
        search: impl FnOnce() -> Result<Option<Path>>,
    ) -> Result<Option<Path>> {
        let use_cache = self.config.caching && prohibited.is_empty();

        if use_cache {
            if let Some(path) = self.caches.paths.get(&key) {
                tracing::trace!("Path cache hit for {} -> {}", key.start, key.destination);
                return Ok((path.cost() <= budget).then_some(path));
            }
        }

        let found = search()?;

        if use_cache {
            if let Some(path) = &found {
                self.caches.paths.insert(key, path.clone());
            }
        }
        Ok(found)
    }

    /// Every coordinate reachable within `budget`, with the cheapest cost to
    /// get there, sorted by cost
    pub fn reachable(
        &self,
        start: OrientedPosition,
        mode: MovementMode,
        budget: u32,
        prohibited: &HexCoordSet,
    ) -> Vec<(HexCoord, u32)> {
        reachability::reachable_hexes(self, start, mode, budget, prohibited)
    }

    /// Resolved sight line from `from` to `to`, endpoints included, with
    /// ambiguous steps settled. Served from the sight cache when possible.
    pub fn sight_line(&self, from: HexCoord, to: HexCoord) -> Vec<HexCoord> {
        if self.config.caching {
            if let Some(line) = self.caches.sight.get(from, to) {
                tracing::trace!("Sight cache hit for {} -> {}", from, to);
                return line;
            }
        }

        let line = visibility::resolve_sight_line(self, from, to);
        if self.config.caching {
            self.caches.sight.insert(from, to, line.clone());
        }
        line
    }

    /// Check line of sight between two hexes
    pub fn has_line_of_sight(&self, from: HexCoord, to: HexCoord) -> bool {
        if !self.is_on_map(from) || !self.is_on_map(to) {
            return false;
        }
        if from == to {
            return true;
        }
        visibility::is_line_clear(self, &self.sight_line(from, to))
    }

    /// Hexes strictly between `from` and `to` along the resolved sight line
    pub fn hexes_along_sight(&self, from: HexCoord, to: HexCoord) -> Vec<&Hex> {
        if !self.is_on_map(from) || !self.is_on_map(to) || from == to {
            return Vec::new();
        }
        let line = self.sight_line(from, to);
        visibility::intervening(&line)
            .iter()
            .filter_map(|coord| self.get_hex(*coord))
            .collect()
    }

    /// Get all existing hexes visible from a position within `range`,
    /// sorted by coordinate. Only stored hexes are visited, so the work is
    /// bounded by the map whatever the range.
    pub fn visible_hexes(&self, from: HexCoord, range: u32) -> Vec<HexCoord> {
        let candidates: Vec<HexCoord> = self
            .hexes
            .keys()
            .copied()
            .filter(|coord| from.distance(coord) <= range)
            .collect();
        let mut visible: Vec<HexCoord> = candidates
            .into_par_iter()
            .filter(|coord| self.has_line_of_sight(from, *coord))
            .collect();
        visible.sort();
        visible
    }

    /// Cached entry counts (paths, sight lines)
    pub fn cache_sizes(&self) -> (usize, usize) {
        (self.caches.paths.len(), self.caches.sight.len())
    }
}
