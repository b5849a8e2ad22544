//! Local engine process and binary downloads
//!
//! Drives a UCI-compatible binary such as Stockfish for one analysis request.

pub mod directory;
pub mod process;

// Re-export main types for convenience
pub use directory::EngineDownload;
pub use process::{EngineError, EngineProcess};
