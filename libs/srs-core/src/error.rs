//! Error types for the core library.

use thiserror::Error;

/// Errors raised while loading the bundled kanji dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("dataset contains no entries")]
    Empty,

    #[error("duplicate character '{character}' in dataset")]
    DuplicateCharacter { character: String },

    #[error("character '{character}' has an empty component list")]
    MissingComponents { character: String },
}
