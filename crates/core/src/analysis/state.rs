//! Running view of one analysis session
//!
//! `AnalysisState` is the reducer behind the dashboard: every event from the
//! work loop goes through [`AnalysisState::handle`] in arrival order, and the
//! display values are derived from the result on demand.

use serde::Serialize;
use shakmaty::Color;
use tracing::{debug, warn};

use super::event::{EventKind, WorkEvent};
use crate::error::Result;
use crate::format;
use crate::lichess::AnalysisRequest;
use crate::position::reconstruct_fen;
use crate::uci::{self, UciDetails};

pub const SLEEPING: &str = "Sleeping";

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisState {
    status: String,
    sleep_duration: u64,
    request: Option<AnalysisRequest>,
    uci: UciDetails,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event.
    ///
    /// The sleep duration only survives until the next event. A request
    /// attached to the event replaces the current one wholesale and starts
    /// the telemetry afresh, since the old search no longer applies.
    pub fn handle(&mut self, event: &WorkEvent) {
        self.sleep_duration = 0;

        if event.analysis_request.is_some() {
            self.uci = UciDetails::default();
        }

        match event.event {
            EventKind::Status => {
                self.status = event.message.clone();
            }
            EventKind::Sleep => {
                self.status = SLEEPING.to_string();
                self.sleep_duration = event.message.trim().parse().unwrap_or_else(|_| {
                    warn!("Sleep event with non-numeric duration: {:?}", event.message);
                    0
                });
            }
            EventKind::ProtocolLine => {
                let update = uci::parse_line(&event.message);
                if update.is_empty() {
                    debug!("Ignoring engine line: {}", event.message);
                }
                self.uci.merge(update);
            }
        }

        if let Some(request) = &event.analysis_request {
            debug!("New analysis request {} (session {})", request.id, request.work.session_id);
            self.request = Some(request.clone());
        }
    }

    /// By-value form of [`AnalysisState::handle`]
    pub fn reduce(mut self, event: &WorkEvent) -> Self {
        self.handle(event);
        self
    }

    /// Forgets everything, as if freshly constructed
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn sleep_duration(&self) -> u64 {
        self.sleep_duration
    }

    pub fn request(&self) -> Option<&AnalysisRequest> {
        self.request.as_ref()
    }

    pub fn uci(&self) -> &UciDetails {
        &self.uci
    }

    /// Current position, replayed from the request's moves on every call
    pub fn fen(&self) -> Result<String> {
        match &self.request {
            Some(request) => reconstruct_fen(
                Some(request.work.initial_fen.as_str()),
                &request.work.moves,
                &request.work.variant,
            ),
            None => reconstruct_fen(None, &[], ""),
        }
    }

    /// Side to move in the current position, white if it cannot be built
    pub fn whose_turn(&self) -> Color {
        self.fen()
            .map(|fen| format::side_to_move(&fen))
            .unwrap_or(Color::White)
    }

    /// White-relative evaluation.
    ///
    /// Empty until the engine reports a score, and also while the position
    /// cannot be rebuilt, since the sign depends on the side to move.
    pub fn evaluation(&self) -> String {
        let Some(score) = &self.uci.score else {
            return String::new();
        };

        match self.fen() {
            Ok(fen) => format::evaluation(format::side_to_move(&fen), score.kind, &score.value),
            Err(e) => {
                debug!("No evaluation without a position: {}", e);
                String::new()
            }
        }
    }

    pub fn nodes(&self) -> String {
        self.uci.nodes.as_deref().map(format::number_with_units).unwrap_or_default()
    }

    pub fn nps(&self) -> String {
        self.uci.nps.as_deref().map(format::number_with_units).unwrap_or_default()
    }

    pub fn time(&self) -> String {
        self.uci.time.as_deref().map(format::time_with_units).unwrap_or_default()
    }

    pub fn hash_usage(&self) -> String {
        self.uci
            .hashfull
            .as_deref()
            .map(format::hashfull_percentage)
            .unwrap_or_default()
    }
}
