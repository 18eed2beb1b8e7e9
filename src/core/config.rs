//! Engine configuration with documented defaults
//!
//! The defaults reproduce the fixed tabletop constants. A config is handed
//! to a [`Grid`](crate::grid::Grid) at construction and never changes for
//! that grid's lifetime.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{HexError, Result};
use crate::grid::constants::DEFAULT_SIGHT_OBSTRUCTION_THRESHOLD;

/// How an ambiguous line-of-sight step (a line running along a hex edge) is
/// resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Take the hex with the greater obstruction (the defender's claim)
    #[default]
    MostObstructed,
    /// Take the hex with the smaller obstruction (the attacker's direct line)
    LeastObstructed,
}

/// Configuration for the movement and visibility engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Accumulated intervening factor at which a line of sight is blocked
    ///
    /// At the default (3), one building, or a heavy woods plus a light
    /// woods, blocks sight.
    pub sight_obstruction_threshold: u32,

    /// Rule for picking between the two hexes of an ambiguous line step
    pub ambiguity_policy: AmbiguityPolicy,

    /// Whether path and sight-line results are memoized on the grid
    ///
    /// Turning this off never changes results, only recomputation cost.
    pub caching: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sight_obstruction_threshold: DEFAULT_SIGHT_OBSTRUCTION_THRESHOLD,
            ambiguity_policy: AmbiguityPolicy::MostObstructed,
            caching: true,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        // A zero threshold blocks any sight line with a hex in between
        if self.sight_obstruction_threshold == 0 {
            return Err(HexError::InvalidConfig(
                "sight_obstruction_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a config from TOML text. Missing fields take their
    /// defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        tracing::debug!("Loading engine config from {:?}", path);
        Self::from_toml_str(&contents)
    }
}
