//! Flood fill of every hex a unit can reach this turn

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::grid::constants::JUMP_HEX_COST;
use crate::grid::hex::{HexCoord, HexCoordSet};
use crate::grid::map::Grid;
use crate::grid::path::MovementMode;
use crate::grid::pathfinding::expand;
use crate::grid::position::OrientedPosition;

/// Cheapest cost to reach each coordinate within `budget`, whatever the
/// final facing. Sorted by cost, then coordinate. The start is always
/// included at cost 0; prohibited hexes never are.
pub fn reachable_hexes(
    grid: &Grid,
    start: OrientedPosition,
    mode: MovementMode,
    budget: u32,
    prohibited: &HexCoordSet,
) -> Vec<(HexCoord, u32)> {
    let mut reached = if mode.is_jump() {
        jump_reachable(grid, start.coord, budget, prohibited)
    } else {
        ground_reachable(grid, start, mode, budget, prohibited)
    };

    reached.sort_by_key(|(coord, cost)| (*cost, *coord));
    tracing::debug!(
        "Reachable from {} ({:?}, budget {}): {} hexes",
        start,
        mode,
        budget,
        reached.len()
    );
    reached
}

/// Dijkstra over oriented states with the pathfinder's edge model
fn ground_reachable(
    grid: &Grid,
    start: OrientedPosition,
    mode: MovementMode,
    budget: u32,
    prohibited: &HexCoordSet,
) -> Vec<(HexCoord, u32)> {
    let mut best_cost: AHashMap<OrientedPosition, u32> = AHashMap::new();
    let mut reached: AHashMap<HexCoord, u32> = AHashMap::new();
    let mut open_set = BinaryHeap::new();

    best_cost.insert(start, 0);
    open_set.push(Reverse((0u32, start)));

    while let Some(Reverse((cost, position))) = open_set.pop() {
        if best_cost.get(&position).is_some_and(|&c| c < cost) {
            continue;
        }
        // First pop of a coordinate is its cheapest
        reached.entry(position.coord).or_insert(cost);

        for edge in expand(grid, position, mode, prohibited) {
            let next_cost = cost + edge.cost;
            if next_cost > budget {
                continue;
            }
            if best_cost.get(&edge.to).is_some_and(|&c| c <= next_cost) {
                continue;
            }
            best_cost.insert(edge.to, next_cost);
            open_set.push(Reverse((next_cost, edge.to)));
        }
    }

    reached.into_iter().collect()
}

/// Every existing, unoccupied hex within jump range. Only stored hexes
/// are visited, so a huge budget costs no more than the map itself.
fn jump_reachable(
    grid: &Grid,
    start: HexCoord,
    budget: u32,
    prohibited: &HexCoordSet,
) -> Vec<(HexCoord, u32)> {
    let max_distance = budget / JUMP_HEX_COST;
    let mut reached: Vec<(HexCoord, u32)> = grid
        .hexes()
        .map(|hex| hex.coord)
        .filter(|coord| *coord != start && !prohibited.contains(coord))
        .filter_map(|coord| {
            let distance = start.distance(&coord);
            (distance <= max_distance).then_some((coord, distance * JUMP_HEX_COST))
        })
        .collect();
    reached.push((start, 0));
    reached
}
