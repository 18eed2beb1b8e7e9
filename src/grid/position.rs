//! Oriented positions: a hex plus the facing of the unit standing on it

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::grid::hex::{Facing, HexCoord};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default, Display,
)]
#[display(fmt = "{} facing {}", coord, facing)]
pub struct OrientedPosition {
    pub coord: HexCoord,
    pub facing: Facing,
}

impl OrientedPosition {
    pub fn new(coord: HexCoord, facing: Facing) -> Self {
        Self { coord, facing }
    }

    /// Same hex, different facing
    pub fn with_facing(&self, facing: Facing) -> Self {
        Self::new(self.coord, facing)
    }

    /// Intermediate positions of the minimal turn to `facing`, one per 60°
    /// step, all on this hex. Empty when already facing that way.
    pub fn turn_to(&self, facing: Facing) -> Vec<OrientedPosition> {
        self.facing
            .turning_steps(facing)
            .into_iter()
            .map(|step| self.with_facing(step))
            .collect()
    }
}
