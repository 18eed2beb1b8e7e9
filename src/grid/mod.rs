//! Hex grid movement and visibility
//!
//! A [`Grid`] owns the hexes of one tactical map. Pathfinding, reachability
//! and line of sight run against it; results are cached on the grid until
//! [`Grid::invalidate_caches`] is called or the map is mutated.

pub mod cache;
pub mod constants;
pub mod export;
pub mod hex;
pub mod jump;
pub mod map;
pub mod path;
pub mod pathfinding;
pub mod position;
pub mod reachability;
pub mod terrain;
pub mod visibility;

// Re-exports for convenient access
pub use constants::*;
pub use export::{HexRecord, MapFile, SegmentRecord};
pub use hex::{Facing, HexCoord, HexCoordSet, LineStep};
pub use map::{Grid, Hex};
pub use path::{MovementMode, Path, PathKey, PathObjective, PathSegment};
pub use position::OrientedPosition;
pub use terrain::Terrain;
