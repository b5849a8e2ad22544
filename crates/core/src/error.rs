//! Error types for engine-bridge-core

use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lichess API error: {0}")]
    Lichess(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Unsupported variant: {0}")]
    UnsupportedVariant(String),

    #[error("Illegal move {uci} at index {index}: {reason}")]
    IllegalMove {
        index: usize,
        uci: String,
        reason: String,
    },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Engine download failed: {0}")]
    EngineDirectory(String),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
