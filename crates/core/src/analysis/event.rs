//! Events delivered to the analysis state

use serde::{Deserialize, Serialize};

use crate::lichess::AnalysisRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Free-text status such as "Waiting for moves"
    Status,
    /// Backing off; the message is the delay in seconds
    Sleep,
    /// One raw line of engine output
    #[serde(rename = "Uci")]
    ProtocolLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkEvent {
    pub event: EventKind,
    pub message: String,
    #[serde(default)]
    pub analysis_request: Option<AnalysisRequest>,
}

impl WorkEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self {
            event: EventKind::Status,
            message: message.into(),
            analysis_request: None,
        }
    }

    pub fn sleep(seconds: u64) -> Self {
        Self {
            event: EventKind::Sleep,
            message: seconds.to_string(),
            analysis_request: None,
        }
    }

    pub fn protocol_line(line: impl Into<String>) -> Self {
        Self {
            event: EventKind::ProtocolLine,
            message: line.into(),
            analysis_request: None,
        }
    }

    pub fn with_request(mut self, request: AnalysisRequest) -> Self {
        self.analysis_request = Some(request);
        self
    }
}
