//! Display-ready snapshot of an [`AnalysisState`]

use serde::Serialize;
use shakmaty::Color;

use super::state::AnalysisState;
use crate::format;

/// Every value the dashboard shows, already formatted.
///
/// Missing telemetry is an empty string so templates never branch on
/// `Option`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisView {
    pub status: String,
    pub sleep_duration: u64,
    pub session_id: String,
    pub work_id: String,
    pub engine_name: String,
    pub variant: String,
    pub fen: String,
    pub fen_error: Option<String>,
    pub whose_turn: String,
    pub evaluation: String,
    pub score_bound: String,
    pub depth: String,
    pub seldepth: String,
    pub multipv: String,
    pub nodes: String,
    pub nps: String,
    pub time: String,
    pub hash_usage: String,
    pub tbhits: String,
    pub pv: Vec<String>,
    pub bestmove: String,
    pub ponder: String,
    pub currmove: String,
    pub currmovenumber: String,
}

impl AnalysisView {
    /// Builds the view, falling back to `last_good_fen` when the current
    /// move list cannot be replayed. The side to move always belongs to the
    /// FEN that is shown.
    pub fn new(state: &AnalysisState, last_good_fen: &str) -> Self {
        let (fen, fen_error) = match state.fen() {
            Ok(fen) => (fen, None),
            Err(e) => (last_good_fen.to_string(), Some(e.to_string())),
        };

        let whose_turn = match format::side_to_move(&fen) {
            Color::White => "white".to_string(),
            Color::Black => "black".to_string(),
        };

        let uci = state.uci();
        let text = |field: &Option<String>| field.clone().unwrap_or_default();

        let mut view = Self {
            status: state.status().to_string(),
            sleep_duration: state.sleep_duration(),
            fen,
            fen_error,
            whose_turn,
            evaluation: state.evaluation(),
            score_bound: uci
                .score
                .as_ref()
                .and_then(|s| s.bound)
                .map(|b| b.as_str().to_string())
                .unwrap_or_default(),
            depth: text(&uci.depth),
            seldepth: text(&uci.seldepth),
            multipv: text(&uci.multipv),
            nodes: state.nodes(),
            nps: state.nps(),
            time: state.time(),
            hash_usage: state.hash_usage(),
            tbhits: text(&uci.tbhits),
            pv: uci.pv.clone().unwrap_or_default(),
            bestmove: text(&uci.bestmove),
            ponder: text(&uci.ponder),
            currmove: text(&uci.currmove),
            currmovenumber: text(&uci.currmovenumber),
            ..Self::default()
        };

        if let Some(request) = state.request() {
            view.session_id = request.work.session_id.clone();
            view.work_id = request.id.clone();
            view.engine_name = request.engine.name.clone();
            view.variant = request.work.variant.clone();
        }

        view
    }
}
