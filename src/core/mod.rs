pub mod config;
pub mod error;

pub use config::{AmbiguityPolicy, EngineConfig};
pub use error::{HexError, Result};
