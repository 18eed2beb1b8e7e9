use thiserror::Error;

use crate::grid::hex::HexCoord;

#[derive(Error, Debug)]
pub enum HexError {
    #[error("Hex {coord} is outside the {width}x{height} map")]
    OutOfBounds {
        coord: HexCoord,
        width: u32,
        height: u32,
    },

    #[error("No hex at {0}")]
    MissingHex(HexCoord),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HexError>;
