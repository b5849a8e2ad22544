//! UCI engine output interpretation
//!
//! Turns raw lines printed by a UCI engine into partial telemetry records
//! that can be merged into a running view of the search.

mod details;
mod parser;

pub use details::{Score, ScoreBound, ScoreKind, UciDetails};
pub use parser::parse_line;
