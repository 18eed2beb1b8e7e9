//! Hex Tactics - movement and visibility engine for hex-grid tactical combat
//!
//! Answers the questions every rule in a turn-based hex wargame asks: the
//! cheapest (or most ground-covering) path between two oriented positions,
//! what a unit can reach with its movement points, and whether two hexes can
//! see each other.

pub mod core;
pub mod grid;
