//! Memoization of path and sight-line results
//!
//! Both caches are shared between concurrent readers of one grid, so they
//! lock internally. Values for one key are deterministic, so a racing insert
//! keeps whichever result landed first.

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::grid::hex::HexCoord;
use crate::grid::path::{Path, PathKey};

/// Completed paths keyed by start, destination, mode and objective
#[derive(Debug, Default)]
pub struct PathCache {
    entries: RwLock<AHashMap<PathKey, Path>>,
}

impl PathCache {
    pub fn get(&self, key: &PathKey) -> Option<Path> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: PathKey, path: Path) {
        tracing::debug!(
            "Caching path {} -> {} ({:?}, {:?}, cost {})",
            key.start,
            key.destination,
            key.mode,
            key.objective,
            path.cost()
        );
        self.entries.write().entry(key).or_insert(path);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Resolved sight lines, endpoints included
#[derive(Debug, Default)]
pub struct SightCache {
    entries: RwLock<AHashMap<(HexCoord, HexCoord), Vec<HexCoord>>>,
}

impl SightCache {
    /// Look up `(from, to)`, falling back to the reversed line stored for
    /// `(to, from)`
    pub fn get(&self, from: HexCoord, to: HexCoord) -> Option<Vec<HexCoord>> {
        let entries = self.entries.read();
        if let Some(line) = entries.get(&(from, to)) {
            return Some(line.clone());
        }
        entries.get(&(to, from)).map(|line| line.iter().rev().copied().collect())
    }

    pub fn insert(&self, from: HexCoord, to: HexCoord, line: Vec<HexCoord>) {
        tracing::debug!("Caching sight line {} -> {} ({} hexes)", from, to, line.len());
        self.entries.write().entry((from, to)).or_insert(line);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// The two caches owned by a grid
#[derive(Debug, Default)]
pub struct GridCaches {
    pub paths: PathCache,
    pub sight: SightCache,
}

impl GridCaches {
    pub fn clear(&self) {
        self.paths.clear();
        self.sight.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.sight.is_empty()
    }
}
