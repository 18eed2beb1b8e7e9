//! Jump movement: free turning, flat cost per hex, terrain ignored

use crate::grid::constants::JUMP_HEX_COST;
use crate::grid::hex::{Facing, HexCoordSet};
use crate::grid::map::Grid;
use crate::grid::path::{MovementMode, Path, PathSegment};
use crate::grid::position::OrientedPosition;

/// Greedy jump path from `start` to `target`
///
/// Every step enters the on-map neighbor closest to the target (lowest
/// facing index on ties), or the target itself once it is adjacent. All
/// hexes cost the same and facing is free, so the greedy walk is optimal:
/// the cost always equals the hex distance. Only the target hex has to
/// exist and be unoccupied.
pub fn find_jump_path(
    grid: &Grid,
    start: OrientedPosition,
    target: OrientedPosition,
    budget: u32,
    prohibited: &HexCoordSet,
) -> Option<Path> {
    if grid.get_hex(target.coord).is_none() || prohibited.contains(&target.coord) {
        return None;
    }
    let distance = start.coord.distance(&target.coord);
    if distance * JUMP_HEX_COST > budget {
        return None;
    }
    if start == target {
        return Some(Path::stationary(start, MovementMode::Jump));
    }
    if distance == 0 {
        return Some(Path::new(
            vec![PathSegment::new(start, target, 0)],
            MovementMode::Jump,
        ));
    }

    let mut segments = Vec::with_capacity(distance as usize);
    let mut current = start;
    while current.coord != target.coord {
        let remaining = current.coord.distance(&target.coord);
        let next = if remaining == 1 {
            target
        } else {
            let facing = Facing::ALL
                .into_iter()
                .filter(|f| grid.is_on_map(current.coord.neighbor(*f)))
                .min_by_key(|f| current.coord.neighbor(*f).distance(&target.coord))?;
            OrientedPosition::new(current.coord.neighbor(facing), facing)
        };

        segments.push(PathSegment::new(current, next, JUMP_HEX_COST));
        current = next;
    }

    tracing::debug!("Jump path {} -> {}: cost {}", start, target, distance);
    Some(Path::new(segments, MovementMode::Jump))
}
