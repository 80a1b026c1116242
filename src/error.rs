//! Error types shared by the core library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PuzzleError {
    #[error("grid size {0} does not hold an even number of cards")]
    InvalidGridSize(usize),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PuzzleError>;
