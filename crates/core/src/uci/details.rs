//! Search telemetry reported by a UCI engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the engine expresses its score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    /// Hundredths of a pawn
    Cp,
    /// Moves until a forced mate
    Mate,
}

impl ScoreKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "cp" => Some(ScoreKind::Cp),
            "mate" => Some(ScoreKind::Mate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreKind::Cp => "cp",
            ScoreKind::Mate => "mate",
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualifier on a score reported before the search settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBound {
    #[serde(rename = "upperbound")]
    Upper,
    #[serde(rename = "lowerbound")]
    Lower,
}

impl ScoreBound {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "upperbound" => Some(ScoreBound::Upper),
            "lowerbound" => Some(ScoreBound::Lower),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBound::Upper => "upperbound",
            ScoreBound::Lower => "lowerbound",
        }
    }
}

/// A score from the engine's point of view (side to move)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub kind: ScoreKind,
    /// Signed decimal text, e.g. `"-119"`
    pub value: String,
    pub bound: Option<ScoreBound>,
}

/// Partial or merged telemetry from `info` and `bestmove` lines.
///
/// Every field is independently optional. Numeric fields keep the literal
/// decimal text the engine printed, so node counts of any size survive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UciDetails {
    pub depth: Option<String>,
    pub seldepth: Option<String>,
    pub multipv: Option<String>,
    pub score: Option<Score>,
    pub nodes: Option<String>,
    pub nps: Option<String>,
    pub hashfull: Option<String>,
    pub tbhits: Option<String>,
    pub time: Option<String>,
    pub pv: Option<Vec<String>>,
    pub bestmove: Option<String>,
    pub ponder: Option<String>,
    pub currmove: Option<String>,
    pub currmovenumber: Option<String>,
}

impl UciDetails {
    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        *self == UciDetails::default()
    }

    /// Right-biased merge: fields present in `update` replace ours,
    /// fields absent in `update` leave ours untouched.
    pub fn merge(&mut self, update: UciDetails) {
        overwrite(&mut self.depth, update.depth);
        overwrite(&mut self.seldepth, update.seldepth);
        overwrite(&mut self.multipv, update.multipv);
        overwrite(&mut self.score, update.score);
        overwrite(&mut self.nodes, update.nodes);
        overwrite(&mut self.nps, update.nps);
        overwrite(&mut self.hashfull, update.hashfull);
        overwrite(&mut self.tbhits, update.tbhits);
        overwrite(&mut self.time, update.time);
        overwrite(&mut self.pv, update.pv);
        overwrite(&mut self.bestmove, update.bestmove);
        overwrite(&mut self.ponder, update.ponder);
        overwrite(&mut self.currmove, update.currmove);
        overwrite(&mut self.currmovenumber, update.currmovenumber);
    }

    /// By-value form of [`UciDetails::merge`]
    pub fn merged(mut self, update: UciDetails) -> Self {
        self.merge(update);
        self
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
