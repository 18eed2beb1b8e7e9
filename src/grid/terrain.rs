//! Terrain layers and their effects
//!
//! A hex carries zero or more layers. Each layer contributes a height (for
//! the hex ceiling), a movement cost factor and a sight obstruction factor.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A terrain layer that can sit on a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Pavement,   // Paved ground, no penalty
    Rough,      // Broken ground, slows movement
    Rubble,     // Collapsed structures
    Water,      // Fordable water
    Smoke,      // Obscures sight, no height
    LightWoods, // Some cover, partial obstruction
    HeavyWoods, // Dense cover, heavy obstruction
    Building,   // Solid structure
}

impl Terrain {
    pub const ALL: [Terrain; 8] = [
        Terrain::Pavement,
        Terrain::Rough,
        Terrain::Rubble,
        Terrain::Water,
        Terrain::Smoke,
        Terrain::LightWoods,
        Terrain::HeavyWoods,
        Terrain::Building,
    ];

    /// Height above the hex level (counts toward the hex ceiling)
    pub fn height(&self) -> i32 {
        match self {
            Terrain::LightWoods => 1,
            Terrain::HeavyWoods | Terrain::Building => 2,
            Terrain::Pavement
            | Terrain::Rough
            | Terrain::Rubble
            | Terrain::Water
            | Terrain::Smoke => 0,
        }
    }

    /// Movement points to enter a hex with this layer (never below 1)
    pub fn movement_cost(&self) -> u32 {
        match self {
            Terrain::Pavement | Terrain::Smoke => 1,
            Terrain::Rough | Terrain::Rubble | Terrain::Water | Terrain::LightWoods => 2,
            Terrain::HeavyWoods => 3,
            Terrain::Building => 4,
        }
    }

    /// Sight obstruction added when a line of sight crosses this layer
    pub fn intervening_factor(&self) -> u32 {
        match self {
            Terrain::LightWoods => 1,
            Terrain::Smoke | Terrain::HeavyWoods => 2,
            Terrain::Building => 3,
            Terrain::Pavement | Terrain::Rough | Terrain::Rubble | Terrain::Water => 0,
        }
    }
}
