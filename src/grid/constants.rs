//! Engine constants - all tunable values in one place
//!
//! Costs are integer movement points.

// Movement
pub const TURN_COST: u32 = 1; // per 60° step
pub const BASE_MOVEMENT_COST: u32 = 1; // hex with no terrain
pub const JUMP_HEX_COST: u32 = 1; // terrain ignored while jumping

// Line of sight
pub const DEFAULT_SIGHT_OBSTRUCTION_THRESHOLD: u32 = 3;

// Line tracing: sub-hex nudge applied to each sample point. The two
// components differ so the nudge is never parallel to a hex edge.
pub const LINE_NUDGE_Q: f64 = 1e-6;
pub const LINE_NUDGE_R: f64 = 2e-6;
