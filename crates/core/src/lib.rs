//! Engine Bridge Core Library
//!
//! Runs a local UCI engine on behalf of Lichess external-engine requests
//! and keeps a display-ready view of the running analysis.

pub mod analysis;
pub mod engine;
pub mod error;
pub mod format;
pub mod lichess;
pub mod position;
pub mod settings;
pub mod storage;
pub mod uci;
pub mod worker;

pub use analysis::{AnalysisState, AnalysisView, EventKind, WorkEvent};
pub use error::{Error, Result};
pub use lichess::ExternalEngineClient;
pub use position::{reconstruct_fen, STARTING_FEN};
pub use settings::Settings;
pub use storage::Database;
pub use uci::{parse_line, UciDetails};
pub use worker::Worker;
