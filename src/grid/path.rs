//! Path representation: ordered move and turn segments
//!
//! Every aggregate (cost, hexes, turns) is derived from the segment list on
//! demand, so a path can never disagree with itself.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{HexError, Result};
use crate::grid::constants::TURN_COST;
use crate::grid::hex::{Facing, HexCoord};
use crate::grid::map::Grid;
use crate::grid::position::OrientedPosition;

/// How a unit moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Ground movement; may back into the hex behind
    #[default]
    Walk,
    /// Ground movement, forward only
    Run,
    /// Free turning, every hex costs 1, terrain ignored
    Jump,
}

impl MovementMode {
    pub fn is_jump(&self) -> bool {
        matches!(self, MovementMode::Jump)
    }

    /// Can the unit enter a hex behind it without turning around?
    pub fn allows_backward(&self) -> bool {
        matches!(self, MovementMode::Walk)
    }
}

/// What a path search optimizes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathObjective {
    /// Fewest movement points
    Shortest,
    /// Most distinct hexes within the budget (best effort)
    Longest,
}

/// One move or turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub from: OrientedPosition,
    pub to: OrientedPosition,
    pub cost: u32,
    /// Backward movement (the unit keeps facing away from the hex it enters)
    pub reversed: bool,
}

impl PathSegment {
    pub fn new(from: OrientedPosition, to: OrientedPosition, cost: u32) -> Self {
        Self {
            from,
            to,
            cost,
            reversed: false,
        }
    }

    /// A rotation without leaving the hex
    pub fn is_turn(&self) -> bool {
        self.from.coord == self.to.coord && self.from.facing != self.to.facing
    }

    pub fn changes_facing(&self) -> bool {
        self.from.facing != self.to.facing
    }
}

/// Arrival at one hex during a search, before turns are expanded into
/// segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PathStep {
    pub position: OrientedPosition,
    pub reversed: bool,
}

/// Identity of a path in the path cache. Segment content is not part of it:
/// the searches are deterministic for a given key and an empty prohibited
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathKey {
    pub start: OrientedPosition,
    pub destination: OrientedPosition,
    pub mode: MovementMode,
    pub objective: PathObjective,
    /// Only the longest search depends on the budget it ran with
    pub budget: Option<u32>,
}

impl PathKey {
    pub fn shortest(start: OrientedPosition, destination: OrientedPosition, mode: MovementMode) -> Self {
        Self {
            start,
            destination,
            mode,
            objective: PathObjective::Shortest,
            budget: None,
        }
    }

    pub fn longest(
        start: OrientedPosition,
        destination: OrientedPosition,
        mode: MovementMode,
        budget: u32,
    ) -> Self {
        Self {
            start,
            destination,
            mode,
            objective: PathObjective::Longest,
            budget: Some(budget),
        }
    }

    pub fn is_jump(&self) -> bool {
        self.mode.is_jump()
    }
}

/// An ordered list of segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<PathSegment>,
    mode: MovementMode,
}

impl Path {
    /// Build a path from segments. Callers are responsible for segment
    /// continuity; the searches in this crate always produce continuous
    /// paths.
    pub fn new(segments: Vec<PathSegment>, mode: MovementMode) -> Self {
        debug_assert!(!segments.is_empty(), "a path has at least one segment");
        Self { segments, mode }
    }

    /// The zero-cost path of a unit that does not move or turn
    pub fn stationary(position: OrientedPosition, mode: MovementMode) -> Self {
        Self::new(vec![PathSegment::new(position, position, 0)], mode)
    }

    /// Rotate in place to `facing`, one segment per step
    pub fn turn_in_place(start: OrientedPosition, facing: Facing, mode: MovementMode) -> Self {
        let turns = start.turn_to(facing);
        if turns.is_empty() {
            return Self::stationary(start, mode);
        }
        let mut segments = Vec::with_capacity(turns.len());
        push_turns(&mut segments, start, &turns);
        Self::new(segments, mode)
    }

    /// Expand search arrivals into segments: for every step, the turns to the
    /// arrival facing and then the move itself, followed by the final turn to
    /// `final_facing`. Entry costs come from the grid, so every entered hex
    /// must exist.
    pub(crate) fn from_steps(
        grid: &Grid,
        start: OrientedPosition,
        steps: &[PathStep],
        final_facing: Facing,
        mode: MovementMode,
    ) -> Result<Self> {
        let mut segments = Vec::new();
        let mut current = start;

        for step in steps {
            let turns = current.turn_to(step.position.facing);
            push_turns(&mut segments, current, &turns);
            current = current.with_facing(step.position.facing);

            let hex = grid
                .get_hex(step.position.coord)
                .ok_or(HexError::MissingHex(step.position.coord))?;
            segments.push(PathSegment {
                from: current,
                to: step.position,
                cost: hex.movement_cost(),
                reversed: step.reversed,
            });
            current = step.position;
        }

        let final_turns = current.turn_to(final_facing);
        push_turns(&mut segments, current, &final_turns);

        if segments.is_empty() {
            return Ok(Self::stationary(start, mode));
        }
        Ok(Self::new(segments, mode))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn is_jump(&self) -> bool {
        self.mode.is_jump()
    }

    pub fn start(&self) -> OrientedPosition {
        self.segments.first().map(|s| s.from).unwrap_or_default()
    }

    pub fn destination(&self) -> OrientedPosition {
        self.segments.last().map(|s| s.to).unwrap_or_default()
    }

    /// Total movement points
    pub fn cost(&self) -> u32 {
        self.segments.iter().map(|s| s.cost).sum()
    }

    /// Distinct hexes in the order they are first entered, start included
    pub fn hexes(&self) -> Vec<HexCoord> {
        let mut seen = AHashSet::new();
        let mut hexes = Vec::new();
        let coords = std::iter::once(self.start().coord).chain(self.segments.iter().map(|s| s.to.coord));
        for coord in coords {
            if seen.insert(coord) {
                hexes.push(coord);
            }
        }
        hexes
    }

    /// Number of hexes moved through (distinct hexes minus the start)
    pub fn hexes_traveled(&self) -> u32 {
        self.hexes().len().saturating_sub(1) as u32
    }

    /// Straight-line hex distance between start and destination
    pub fn distance(&self) -> u32 {
        self.start().coord.distance(&self.destination().coord)
    }

    /// Segments that change facing
    pub fn turn_count(&self) -> u32 {
        self.segments.iter().filter(|s| s.changes_facing()).count() as u32
    }

    /// Cache identity of this path for the shortest objective
    pub fn key(&self) -> PathKey {
        PathKey::shortest(self.start(), self.destination(), self.mode)
    }
}

fn push_turns(segments: &mut Vec<PathSegment>, from: OrientedPosition, turns: &[OrientedPosition]) {
    let mut current = from;
    for turn in turns {
        segments.push(PathSegment::new(current, *turn, TURN_COST));
        current = *turn;
    }
}
