//! Hex coordinate system for tactical maps (axial coordinates)
//!
//! Uses axial coordinates (q, r); the cube coordinate S is derived when
//! needed. Facing `i` always points at neighbor `i`, so direction math and
//! neighbor enumeration share one ordering.

use ahash::AHashSet;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::grid::constants::{LINE_NUDGE_Q, LINE_NUDGE_R};

/// A set of hex coordinates (occupied hexes, visited hexes, ...)
pub type HexCoordSet = AHashSet<HexCoord>;

/// Axial hex coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default, Display,
)]
#[display(fmt = "({}, {})", q, r)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Distance in hex steps
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// The adjacent hex in the given direction
    pub fn neighbor(&self, facing: Facing) -> HexCoord {
        let offset = facing.offset();
        HexCoord::new(self.q + offset.q, self.r + offset.r)
    }

    /// Get all 6 neighboring hex coordinates, in [`Facing`] order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Facing::ALL.map(|facing| self.neighbor(facing))
    }

    /// Facing needed to step from self into `other`, if they are adjacent
    pub fn direction_to(&self, other: &Self) -> Option<Facing> {
        Facing::ALL
            .into_iter()
            .find(|facing| self.neighbor(*facing) == *other)
    }

    /// Trace the hexes from self to other (inclusive).
    ///
    /// Where the geometric line runs exactly along the edge shared by two
    /// hexes, the step is [`LineStep::Ambiguous`] and both hexes are kept.
    /// The line is traced twice with opposite sub-hex nudges; the nudged
    /// traces only disagree where the line touches an edge. Options are
    /// ordered by coordinate so that `b.line_to(a)` is exactly the reverse
    /// of `a.line_to(b)`.
    pub fn line_to(&self, other: &Self) -> Vec<LineStep> {
        let n = self.distance(other);
        if n == 0 {
            return vec![LineStep::Unambiguous(*self)];
        }

        let mut steps = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            let t = f64::from(i) / f64::from(n);
            let q = f64::from(self.q) + f64::from(other.q - self.q) * t;
            let r = f64::from(self.r) + f64::from(other.r - self.r) * t;

            let high = Self::round(q + LINE_NUDGE_Q, r + LINE_NUDGE_R);
            let low = Self::round(q - LINE_NUDGE_Q, r - LINE_NUDGE_R);

            steps.push(if high == low {
                LineStep::Unambiguous(high)
            } else {
                LineStep::Ambiguous(high.min(low), high.max(low))
            });
        }
        steps
    }

    /// Round floating point hex to nearest integer hex
    fn round(q: f64, r: f64) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }

    /// Get all hexes within range (inclusive). The result holds
    /// `3r(r+1)+1` coordinates, so callers bound `range` by the map.
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = i32::try_from(range).unwrap_or(i32::MAX);
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }
}

/// One step of a traced line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStep {
    /// The line passes cleanly through one hex
    Unambiguous(HexCoord),
    /// The line runs along the edge of two hexes; either one is a valid
    /// continuation
    Ambiguous(HexCoord, HexCoord),
}

impl LineStep {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, LineStep::Ambiguous(..))
    }

    /// The first (or only) option of this step
    pub fn primary(&self) -> HexCoord {
        match self {
            LineStep::Unambiguous(coord) | LineStep::Ambiguous(coord, _) => *coord,
        }
    }

    /// All candidate hexes for this step
    pub fn options(&self) -> Vec<HexCoord> {
        match self {
            LineStep::Unambiguous(coord) => vec![*coord],
            LineStep::Ambiguous(a, b) => vec![*a, *b],
        }
    }
}

/// One of the six 60° orientations a unit can face
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    #[default]
    Top,
    TopRight,
    BottomRight,
    Bottom,
    BottomLeft,
    TopLeft,
}

impl Facing {
    /// All facings in rotation order
    pub const ALL: [Facing; 6] = [
        Facing::Top,
        Facing::TopRight,
        Facing::BottomRight,
        Facing::Bottom,
        Facing::BottomLeft,
        Facing::TopLeft,
    ];

    /// Position of this facing in the rotation (0..=5)
    pub fn index(&self) -> i32 {
        match self {
            Facing::Top => 0,
            Facing::TopRight => 1,
            Facing::BottomRight => 2,
            Facing::Bottom => 3,
            Facing::BottomLeft => 4,
            Facing::TopLeft => 5,
        }
    }

    /// Facing for any integer index, wrapped into the 6-step cycle
    pub fn from_index(index: i32) -> Self {
        Facing::ALL[index.rem_euclid(6) as usize]
    }

    /// Get the axial offset for this direction
    pub fn offset(&self) -> HexCoord {
        match self {
            Facing::Top => HexCoord::new(1, 0),
            Facing::TopRight => HexCoord::new(1, -1),
            Facing::BottomRight => HexCoord::new(0, -1),
            Facing::Bottom => HexCoord::new(-1, 0),
            Facing::BottomLeft => HexCoord::new(-1, 1),
            Facing::TopLeft => HexCoord::new(0, 1),
        }
    }

    /// Rotate by a signed number of 60° steps
    pub fn rotate(&self, steps: i32) -> Self {
        Self::from_index(self.index() + steps)
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        self.rotate(3)
    }

    /// Shortest sequence of unit rotations from self to `to`.
    ///
    /// Each entry is the facing after one 60° step; the last entry is `to`.
    /// A half turn rotates in the positive direction.
    pub fn turning_steps(&self, to: Facing) -> Vec<Facing> {
        let delta = (to.index() - self.index()).rem_euclid(6);
        let (step, count) = if delta <= 3 { (1, delta) } else { (-1, 6 - delta) };
        (1..=count).map(|i| self.rotate(step * i)).collect()
    }

    /// Number of 60° steps between two facings
    pub fn turn_distance(&self, to: Facing) -> u32 {
        let delta = (to.index() - self.index()).rem_euclid(6);
        delta.min(6 - delta) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_coord_creation() {
        let coord = HexCoord::new(5, 10);
        assert_eq!(coord.q, 5);
        assert_eq!(coord.r, 10);
        assert_eq!(coord.s(), -15);
    }

    #[test]
    fn test_hex_distance_same() {
        let a = HexCoord::new(3, 3);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_hex_distance_adjacent() {
        let a = HexCoord::new(3, 3);
        for neighbor in a.neighbors() {
            assert_eq!(a.distance(&neighbor), 1);
        }
    }

    #[test]
    fn test_hex_distance_symmetric() {
        let a = HexCoord::new(1, 4);
        let b = HexCoord::new(6, 2);
        assert_eq!(a.distance(&b), 5);
        assert_eq!(b.distance(&a), 5);
    }

    #[test]
    fn test_neighbors_match_facing_order() {
        let coord = HexCoord::new(4, 4);
        for (i, neighbor) in coord.neighbors().into_iter().enumerate() {
            assert_eq!(coord.direction_to(&neighbor), Some(Facing::from_index(i as i32)));
        }
        assert_eq!(coord.direction_to(&HexCoord::new(6, 4)), None);
        assert_eq!(coord.direction_to(&coord), None);
    }

    #[test]
    fn test_top_steps_along_q() {
        let coord = HexCoord::new(1, 1);
        assert_eq!(coord.neighbor(Facing::Top), HexCoord::new(2, 1));
        assert_eq!(coord.neighbor(Facing::Bottom), HexCoord::new(0, 1));
    }

    #[test]
    fn test_rotate_wraps() {
        assert_eq!(Facing::Top.rotate(1), Facing::TopRight);
        assert_eq!(Facing::Top.rotate(-1), Facing::TopLeft);
        assert_eq!(Facing::TopLeft.rotate(1), Facing::Top);
        assert_eq!(Facing::Bottom.rotate(-9), Facing::Top);
        assert_eq!(Facing::BottomLeft.rotate(12), Facing::BottomLeft);
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Facing::Top.opposite(), Facing::Bottom);
        assert_eq!(Facing::TopRight.opposite(), Facing::BottomLeft);
        for facing in Facing::ALL {
            assert_eq!(facing.opposite().opposite(), facing);
        }
    }

    #[test]
    fn test_turning_steps_shortest_direction() {
        assert!(Facing::Top.turning_steps(Facing::Top).is_empty());
        assert_eq!(Facing::Top.turning_steps(Facing::TopRight), vec![Facing::TopRight]);
        assert_eq!(Facing::Top.turning_steps(Facing::TopLeft), vec![Facing::TopLeft]);
        assert_eq!(
            Facing::Top.turning_steps(Facing::BottomLeft),
            vec![Facing::TopLeft, Facing::BottomLeft]
        );
        assert_eq!(
            Facing::Top.turning_steps(Facing::Bottom),
            vec![Facing::TopRight, Facing::BottomRight, Facing::Bottom]
        );
    }

    #[test]
    fn test_turn_distance_matches_steps() {
        for from in Facing::ALL {
            for to in Facing::ALL {
                assert_eq!(from.turn_distance(to) as usize, from.turning_steps(to).len());
                assert!(from.turn_distance(to) <= 3);
            }
        }
    }

    #[test]
    fn test_hex_line_straight() {
        let a = HexCoord::new(1, 1);
        let b = HexCoord::new(4, 1);
        let line = a.line_to(&b);
        assert_eq!(line.len(), 4); // Includes start and end
        assert!(line.iter().all(|step| !step.is_ambiguous()));
        assert_eq!(line[0], LineStep::Unambiguous(a));
        assert_eq!(line[3], LineStep::Unambiguous(b));
    }

    #[test]
    fn test_hex_line_along_edges_is_ambiguous() {
        let a = HexCoord::new(1, 1);
        let b = HexCoord::new(3, 3);
        let line = a.line_to(&b);
        assert_eq!(
            line,
            vec![
                LineStep::Unambiguous(HexCoord::new(1, 1)),
                LineStep::Ambiguous(HexCoord::new(1, 2), HexCoord::new(2, 1)),
                LineStep::Unambiguous(HexCoord::new(2, 2)),
                LineStep::Ambiguous(HexCoord::new(2, 3), HexCoord::new(3, 2)),
                LineStep::Unambiguous(HexCoord::new(3, 3)),
            ]
        );
    }

    #[test]
    fn test_hex_line_reverses() {
        let a = HexCoord::new(2, 7);
        let b = HexCoord::new(9, 3);
        let mut backward = b.line_to(&a);
        backward.reverse();
        assert_eq!(a.line_to(&b), backward);
    }

    #[test]
    fn test_hex_line_single() {
        let a = HexCoord::new(2, 2);
        assert_eq!(a.line_to(&a), vec![LineStep::Unambiguous(a)]);
    }

    #[test]
    fn test_hexes_in_range() {
        let center = HexCoord::new(0, 0);
        let range_1 = center.hexes_in_range(1);
        assert_eq!(range_1.len(), 7); // Center + 6 neighbors
        assert_eq!(center.hexes_in_range(2).len(), 19);
        assert_eq!(center.hexes_in_range(0), vec![center]);
    }
}
