use thiserror;

use crate::engine::grid::{Idx, Value};

/// The Result type for agent48.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error")]
    StdIOError(#[from] std::io::Error),

    #[error("log error")]
    LogError(#[from] log::SetLoggerError),

    #[error("invalid spawn weights: {0}")]
    SpawnWeights(#[from] rand::distributions::WeightedError),

    #[error("invalid cell value: {0}")]
    ParseValue(#[from] std::num::ParseIntError),

    #[error("tile value {value} at {idx} is not a power of two of at least 2")]
    InvalidTileValue { value: Value, idx: Idx },

    #[error("a 4x4 board needs 16 cells, got {0}")]
    InvalidCellCount(usize),
}
