//! A* pathfinding over oriented positions
//!
//! Turning costs movement points, so the search state is a coordinate plus a
//! facing. Two objectives share one edge model: the cheapest path, and a
//! best-effort path covering as many hexes as the budget allows.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::core::error::Result;
use crate::grid::constants::TURN_COST;
use crate::grid::hex::{Facing, HexCoord, HexCoordSet};
use crate::grid::map::Grid;
use crate::grid::path::{MovementMode, Path, PathStep};
use crate::grid::position::OrientedPosition;

/// One move out of a state: the turns needed, then entering the neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub to: OrientedPosition,
    pub cost: u32,
    pub reversed: bool,
}

/// Moves available from `from`. Absent and prohibited hexes are skipped, not
/// treated as expensive. Walking units may also back into the hex behind
/// them, keeping their facing.
pub(crate) fn expand(
    grid: &Grid,
    from: OrientedPosition,
    mode: MovementMode,
    prohibited: &HexCoordSet,
) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(12);
    for direction in Facing::ALL {
        let neighbor = from.coord.neighbor(direction);
        if prohibited.contains(&neighbor) {
            continue;
        }
        let Some(hex) = grid.get_hex(neighbor) else {
            continue;
        };
        let entry = hex.movement_cost();

        edges.push(Edge {
            to: OrientedPosition::new(neighbor, direction),
            cost: from.facing.turn_distance(direction) * TURN_COST + entry,
            reversed: false,
        });

        if mode.allows_backward() {
            let backward = direction.opposite();
            edges.push(Edge {
                to: OrientedPosition::new(neighbor, backward),
                cost: from.facing.turn_distance(backward) * TURN_COST + entry,
                reversed: true,
            });
        }
    }
    edges
}

/// Search node; nodes live in an arena and point back at their parent
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    step: PathStep,
    parent: Option<usize>,
    cost: u32,
    /// Distinct hexes entered so far (longest search only)
    hexes: u32,
    /// Arrival at the target with the final turn already paid
    terminal: bool,
}

impl SearchNode {
    fn root(start: OrientedPosition) -> Self {
        Self {
            step: PathStep {
                position: start,
                reversed: false,
            },
            parent: None,
            cost: 0,
            hexes: 0,
            terminal: false,
        }
    }
}

/// Steps from the root to `index`, root and terminal markers excluded
fn reconstruct_steps(nodes: &[SearchNode], index: usize) -> Vec<PathStep> {
    let mut steps = Vec::new();
    let mut current = Some(index);
    while let Some(i) = current {
        let node = &nodes[i];
        if node.parent.is_some() && !node.terminal {
            steps.push(node.step);
        }
        current = node.parent;
    }
    steps.reverse();
    steps
}

/// Is `coord` already on the chain ending at `index`?
fn chain_contains(nodes: &[SearchNode], index: usize, coord: HexCoord) -> bool {
    let mut current = Some(index);
    while let Some(i) = current {
        if nodes[i].step.position.coord == coord {
            return true;
        }
        current = nodes[i].parent;
    }
    false
}

/// Pure rotation on the start hex, if it fits the budget
fn same_hex_path(
    start: OrientedPosition,
    target: OrientedPosition,
    mode: MovementMode,
    budget: u32,
) -> Option<Path> {
    let turn_cost = start.facing.turn_distance(target.facing) * TURN_COST;
    (turn_cost <= budget).then(|| Path::turn_in_place(start, target.facing, mode))
}

/// Quick rejections shared by both searches
fn target_unreachable(
    grid: &Grid,
    start: OrientedPosition,
    target: OrientedPosition,
    budget: u32,
    prohibited: &HexCoordSet,
) -> bool {
    grid.get_hex(target.coord).is_none()
        || prohibited.contains(&target.coord)
        || start.coord.distance(&target.coord) > budget
}

/// Find the cheapest path with A*
///
/// Priority is cost so far plus hex distance to the target. Every hex costs
/// at least 1 to enter, so the heuristic never overestimates. Reaching the
/// target hex with the wrong facing queues a terminal node with the final
/// turn paid; the first terminal node popped is optimal.
///
/// Returns `Ok(None)` if no path fits the budget.
pub fn find_shortest_path(
    grid: &Grid,
    start: OrientedPosition,
    target: OrientedPosition,
    mode: MovementMode,
    budget: u32,
    prohibited: &HexCoordSet,
) -> Result<Option<Path>> {
    if start.coord == target.coord {
        return Ok(same_hex_path(start, target, mode, budget));
    }
    if target_unreachable(grid, start, target, budget, prohibited) {
        return Ok(None);
    }

    let mut nodes = vec![SearchNode::root(start)];
    let mut best_cost: AHashMap<OrientedPosition, u32> = AHashMap::new();
    let mut open_set = BinaryHeap::new();

    best_cost.insert(start, 0);
    open_set.push(Reverse((start.coord.distance(&target.coord), 0usize)));

    let mut expanded = 0usize;
    while let Some(Reverse((_, index))) = open_set.pop() {
        let node = nodes[index];
        let position = node.step.position;

        if node.terminal {
            tracing::debug!(
                "Shortest path {} -> {}: cost {}, {} nodes expanded",
                start,
                target,
                node.cost,
                expanded
            );
            let steps = reconstruct_steps(&nodes, index);
            return Path::from_steps(grid, start, &steps, target.facing, mode).map(Some);
        }

        // Stale entry superseded by a cheaper arrival
        if best_cost.get(&position).is_some_and(|&c| c < node.cost) {
            continue;
        }
        expanded += 1;

        if position.coord == target.coord {
            let total = node.cost + position.facing.turn_distance(target.facing) * TURN_COST;
            if total <= budget {
                nodes.push(SearchNode {
                    parent: Some(index),
                    cost: total,
                    terminal: true,
                    ..node
                });
                open_set.push(Reverse((total, nodes.len() - 1)));
            }
        }

        for edge in expand(grid, position, mode, prohibited) {
            let cost = node.cost + edge.cost;
            if cost > budget {
                continue;
            }
            if best_cost.get(&edge.to).is_some_and(|&c| c <= cost) {
                continue;
            }
            best_cost.insert(edge.to, cost);

            nodes.push(SearchNode {
                step: PathStep {
                    position: edge.to,
                    reversed: edge.reversed,
                },
                parent: Some(index),
                cost,
                hexes: 0,
                terminal: false,
            });
            let priority = cost + edge.to.coord.distance(&target.coord);
            open_set.push(Reverse((priority, nodes.len() - 1)));
        }
    }

    tracing::debug!(
        "No path {} -> {} within {} ({} nodes expanded)",
        start,
        target,
        budget,
        expanded
    );
    Ok(None)
}

/// Cost and hex count of one route into a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Label {
    cost: u32,
    hexes: u32,
}

impl Label {
    fn dominates(&self, other: &Label) -> bool {
        self.cost <= other.cost && self.hexes >= other.hexes
    }
}

/// Find a path covering as many distinct hexes as the budget allows.
///
/// **This is an approximation.** It is not guaranteed to find the true
/// longest path, and callers rely on its speed rather than on optimality:
///
/// - routes never re-enter a hex already on their own chain;
/// - each state keeps only the routes not dominated on both cost and hex
///   count, so a dominated route is dropped even if it visited a more
///   useful set of hexes;
/// - routes are explored most-hexes-first, then closest-to-target, and
///   pruned once `hexes + remaining budget` cannot beat the best completed
///   route.
///
/// The shortest path seeds the best result, so the result never covers
/// fewer hexes than [`find_shortest_path`]. Ties on hex count keep the
/// cheaper route.
pub fn find_longest_path(
    grid: &Grid,
    start: OrientedPosition,
    target: OrientedPosition,
    mode: MovementMode,
    budget: u32,
    prohibited: &HexCoordSet,
) -> Result<Option<Path>> {
    let Some(shortest) = find_shortest_path(grid, start, target, mode, budget, prohibited)? else {
        return Ok(None);
    };
    if start.coord == target.coord {
        return Ok(Some(shortest));
    }

    let mut best_hexes = shortest.hexes_traveled();
    let mut best_cost = shortest.cost();
    let mut best_node: Option<usize> = None;

    let mut nodes = vec![SearchNode::root(start)];
    let mut labels: AHashMap<OrientedPosition, Vec<Label>> = AHashMap::new();
    let mut open_set = BinaryHeap::new();

    labels.insert(start, vec![Label { cost: 0, hexes: 0 }]);
    open_set.push((0u32, Reverse(start.coord.distance(&target.coord)), Reverse(0usize)));

    let mut expanded = 0usize;
    while let Some((hexes, _, Reverse(index))) = open_set.pop() {
        let node = nodes[index];
        let position = node.step.position;

        if hexes + (budget - node.cost) <= best_hexes {
            continue;
        }
        expanded += 1;

        // Leaving the target can never lead back to it
        if position.coord == target.coord {
            let total = node.cost + position.facing.turn_distance(target.facing) * TURN_COST;
            let better = hexes > best_hexes || (hexes == best_hexes && total < best_cost);
            if total <= budget && better {
                best_hexes = hexes;
                best_cost = total;
                best_node = Some(index);
            }
            continue;
        }

        for edge in expand(grid, position, mode, prohibited) {
            let cost = node.cost + edge.cost;
            if cost > budget || budget - cost < edge.to.coord.distance(&target.coord) {
                continue;
            }
            if chain_contains(&nodes, index, edge.to.coord) {
                continue;
            }

            let label = Label {
                cost,
                hexes: hexes + 1,
            };
            let state_labels = labels.entry(edge.to).or_default();
            if state_labels.iter().any(|l| l.dominates(&label)) {
                continue;
            }
            state_labels.retain(|l| !label.dominates(l));
            state_labels.push(label);

            nodes.push(SearchNode {
                step: PathStep {
                    position: edge.to,
                    reversed: edge.reversed,
                },
                parent: Some(index),
                cost,
                hexes: label.hexes,
                terminal: false,
            });
            let distance = edge.to.coord.distance(&target.coord);
            open_set.push((label.hexes, Reverse(distance), Reverse(nodes.len() - 1)));
        }
    }

    tracing::debug!(
        "Longest path {} -> {}: {} hexes, cost {}, {} nodes expanded",
        start,
        target,
        best_hexes,
        best_cost,
        expanded
    );

    match best_node {
        Some(index) => {
            let steps = reconstruct_steps(&nodes, index);
            Path::from_steps(grid, start, &steps, target.facing, mode).map(Some)
        }
        None => Ok(Some(shortest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::map::Hex;
    use crate::grid::terrain::Terrain;

    fn pos(q: i32, r: i32, facing: Facing) -> OrientedPosition {
        OrientedPosition::new(HexCoord::new(q, r), facing)
    }

    fn no_prohibited() -> HexCoordSet {
        HexCoordSet::default()
    }

    #[test]
    fn test_expand_skips_absent_and_prohibited() {
        let mut grid = Grid::new(5, 5);
        for coord in [(2, 2), (3, 2), (2, 3)] {
            grid.add_hex(Hex::new(HexCoord::new(coord.0, coord.1))).unwrap();
        }
        let mut prohibited = no_prohibited();
        prohibited.insert(HexCoord::new(2, 3));

        let edges = expand(&grid, pos(2, 2, Facing::Top), MovementMode::Run, &prohibited);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, pos(3, 2, Facing::Top));
        assert_eq!(edges[0].cost, 1);
    }

    #[test]
    fn test_expand_backward_only_when_walking() {
        let grid = Grid::filled(5, 5);
        let from = pos(3, 3, Facing::Top);

        let walk = expand(&grid, from, MovementMode::Walk, &no_prohibited());
        assert_eq!(walk.len(), 12);
        let back = walk
            .iter()
            .find(|e| e.reversed && e.to.coord == HexCoord::new(2, 3))
            .unwrap();
        assert_eq!(back.to.facing, Facing::Top);
        assert_eq!(back.cost, 1);

        let run = expand(&grid, from, MovementMode::Run, &no_prohibited());
        assert_eq!(run.len(), 6);
        assert!(run.iter().all(|e| !e.reversed));
    }

    #[test]
    fn test_straight_path() {
        let grid = Grid::filled(5, 5);
        let path = find_shortest_path(
            &grid,
            pos(1, 1, Facing::Top),
            pos(3, 1, Facing::Top),
            MovementMode::Walk,
            2,
            &no_prohibited(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(path.cost(), 2);
        assert_eq!(path.hexes_traveled(), 2);
        assert_eq!(path.turn_count(), 0);
        assert_eq!(path.segments().len(), 2);
    }

    #[test]
    fn test_budget_too_small() {
        let grid = Grid::filled(5, 5);
        let path = find_shortest_path(
            &grid,
            pos(1, 1, Facing::Top),
            pos(3, 1, Facing::Top),
            MovementMode::Walk,
            1,
            &no_prohibited(),
        )
        .unwrap();
        assert!(path.is_none());
    }

    #[test]
    fn test_final_turn_must_fit_budget() {
        let grid = Grid::filled(5, 5);
        let start = pos(1, 1, Facing::Top);
        let target = pos(3, 1, Facing::TopRight);

        let tight = find_shortest_path(&grid, start, target, MovementMode::Run, 2, &no_prohibited()).unwrap();
        assert!(tight.is_none());

        let path = find_shortest_path(&grid, start, target, MovementMode::Run, 3, &no_prohibited())
            .unwrap()
            .unwrap();
        assert_eq!(path.cost(), 3);
        assert_eq!(path.destination(), target);
    }

    #[test]
    fn test_same_hex_turning() {
        let grid = Grid::filled(5, 5);
        let start = pos(2, 2, Facing::Top);

        let turn = find_shortest_path(&grid, start, pos(2, 2, Facing::BottomLeft), MovementMode::Run, 5, &no_prohibited())
            .unwrap()
            .unwrap();
        assert_eq!(turn.cost(), 2);
        assert_eq!(turn.hexes_traveled(), 0);

        let still = find_shortest_path(&grid, start, start, MovementMode::Run, 0, &no_prohibited())
            .unwrap()
            .unwrap();
        assert_eq!(still.cost(), 0);
        assert_eq!(still.segments().len(), 1);

        let too_far = find_shortest_path(&grid, start, pos(2, 2, Facing::Bottom), MovementMode::Run, 2, &no_prohibited())
            .unwrap();
        assert!(too_far.is_none());
    }

    #[test]
    fn test_walk_backs_up_instead_of_turning() {
        let grid = Grid::filled(5, 5);
        let start = pos(3, 3, Facing::Top);
        let target = pos(2, 3, Facing::Top);

        let walk = find_shortest_path(&grid, start, target, MovementMode::Walk, 10, &no_prohibited())
            .unwrap()
            .unwrap();
        assert_eq!(walk.cost(), 1);
        assert!(walk.segments()[0].reversed);

        // Running must turn around, move, and turn back
        let run = find_shortest_path(&grid, start, target, MovementMode::Run, 10, &no_prohibited())
            .unwrap()
            .unwrap();
        assert_eq!(run.cost(), 7);
        assert!(run.segments().iter().all(|s| !s.reversed));
    }

    #[test]
    fn test_path_around_terrain() {
        let mut grid = Grid::filled(6, 6);
        grid.add_terrain(HexCoord::new(3, 3), Terrain::Building).unwrap();

        let path = find_shortest_path(
            &grid,
            pos(2, 3, Facing::Top),
            pos(4, 3, Facing::Top),
            MovementMode::Run,
            20,
            &no_prohibited(),
        )
        .unwrap()
        .unwrap();

        // Through the building: 4 + 1. Around it: 3 moves and 4 turns.
        assert_eq!(path.cost(), 5);
        assert!(path.hexes().contains(&HexCoord::new(3, 3)));
    }

    #[test]
    fn test_detour_around_expensive_terrain() {
        let mut grid = Grid::filled(6, 6);
        for q in 3..=4 {
            grid.add_terrain(HexCoord::new(q, 3), Terrain::Building).unwrap();
        }

        // Through: 4 + 4 + 1 = 9. Around via (3,4) and (4,4): 8.
        let path = find_shortest_path(
            &grid,
            pos(2, 3, Facing::Top),
            pos(5, 3, Facing::Top),
            MovementMode::Run,
            20,
            &no_prohibited(),
        )
        .unwrap()
        .unwrap();
        assert!(path.cost() < 9);
        assert!(!path.hexes().contains(&HexCoord::new(3, 3)));
    }

    #[test]
    fn test_prohibited_forces_detour() {
        let grid = Grid::filled(5, 5);
        let mut prohibited = no_prohibited();
        prohibited.insert(HexCoord::new(2, 1));

        let path = find_shortest_path(
            &grid,
            pos(1, 1, Facing::Top),
            pos(3, 1, Facing::Top),
            MovementMode::Run,
            20,
            &prohibited,
        )
        .unwrap()
        .unwrap();
        assert!(!path.hexes().contains(&HexCoord::new(2, 1)));
        assert!(path.cost() > 2);
    }

    #[test]
    fn test_no_path_to_missing_or_prohibited_target() {
        let mut grid = Grid::new(5, 5);
        grid.add_hex(Hex::new(HexCoord::new(1, 1))).unwrap();
        let start = pos(1, 1, Facing::Top);

        let missing = find_shortest_path(&grid, start, pos(2, 1, Facing::Top), MovementMode::Walk, 10, &no_prohibited())
            .unwrap();
        assert!(missing.is_none());

        let grid = Grid::filled(5, 5);
        let mut prohibited = no_prohibited();
        prohibited.insert(HexCoord::new(2, 1));
        let occupied = find_shortest_path(&grid, start, pos(2, 1, Facing::Top), MovementMode::Walk, 10, &prohibited)
            .unwrap();
        assert!(occupied.is_none());
    }

    #[test]
    fn test_walled_off_target() {
        let mut grid = Grid::new(5, 5);
        for q in 1..=2 {
            for r in 1..=5 {
                grid.add_hex(Hex::new(HexCoord::new(q, r))).unwrap();
            }
        }
        grid.add_hex(Hex::new(HexCoord::new(5, 5))).unwrap();

        let path = find_shortest_path(
            &grid,
            pos(1, 1, Facing::Top),
            pos(5, 5, Facing::Top),
            MovementMode::Walk,
            50,
            &no_prohibited(),
        )
        .unwrap();
        assert!(path.is_none());
    }

    #[test]
    fn test_longest_covers_more_hexes() {
        let grid = Grid::filled(5, 5);
        let start = pos(1, 1, Facing::Top);
        let target = pos(3, 1, Facing::Top);

        let shortest = find_shortest_path(&grid, start, target, MovementMode::Run, 8, &no_prohibited())
            .unwrap()
            .unwrap();
        let longest = find_longest_path(&grid, start, target, MovementMode::Run, 8, &no_prohibited())
            .unwrap()
            .unwrap();

        assert!(longest.hexes_traveled() > shortest.hexes_traveled());
        assert!(longest.cost() <= 8);
        assert_eq!(longest.destination(), target);
    }

    #[test]
    fn test_longest_never_revisits() {
        let grid = Grid::filled(5, 5);
        let longest = find_longest_path(
            &grid,
            pos(2, 2, Facing::Top),
            pos(4, 2, Facing::Top),
            MovementMode::Walk,
            10,
            &no_prohibited(),
        )
        .unwrap()
        .unwrap();

        let entered: Vec<HexCoord> = longest
            .segments()
            .iter()
            .filter(|s| !s.is_turn())
            .map(|s| s.to.coord)
            .collect();
        let distinct: HexCoordSet = entered.iter().copied().collect();
        assert_eq!(entered.len(), distinct.len());
    }

    #[test]
    fn test_longest_with_exact_budget_is_shortest() {
        let grid = Grid::filled(5, 5);
        let start = pos(1, 1, Facing::Top);
        let target = pos(3, 1, Facing::Top);
        let longest = find_longest_path(&grid, start, target, MovementMode::Walk, 2, &no_prohibited())
            .unwrap()
            .unwrap();
        assert_eq!(longest.cost(), 2);
        assert_eq!(longest.hexes_traveled(), 2);
    }

    #[test]
    fn test_longest_none_when_unreachable() {
        let grid = Grid::filled(5, 5);
        let longest = find_longest_path(
            &grid,
            pos(1, 1, Facing::Top),
            pos(5, 5, Facing::Top),
            MovementMode::Walk,
            3,
            &no_prohibited(),
        )
        .unwrap();
        assert!(longest.is_none());
    }
}
