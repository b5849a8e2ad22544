use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use engine_bridge_core::analysis::{AnalysisView, LoggedEvent};
use engine_bridge_core::lichess::AnalysisRequest;

use super::current_view;
use crate::{lock, AppState};

const DEFAULT_EVENT_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// One event log entry as shown to the user
#[derive(Debug, Serialize)]
pub struct EventRow {
    pub id: u64,
    pub time: String,
    pub kind: String,
    pub message: String,
}

impl From<&LoggedEvent> for EventRow {
    fn from(entry: &LoggedEvent) -> Self {
        let time = chrono::DateTime::from_timestamp_millis(entry.received_at as i64)
            .map(|d| d.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_default();

        EventRow {
            id: entry.id,
            time,
            kind: format!("{:?}", entry.event.event),
            message: entry.event.message.clone(),
        }
    }
}

pub fn event_rows(state: &AppState, limit: usize) -> Vec<EventRow> {
    lock(&state.events).recent(limit).into_iter().map(EventRow::from).collect()
}

pub async fn analysis(State(state): State<Arc<AppState>>) -> Json<AnalysisView> {
    Json(current_view(&state))
}

pub async fn events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<EventRow>> {
    Json(event_rows(&state, query.limit.unwrap_or(DEFAULT_EVENT_LIMIT)))
}

/// Every request received since startup, newest first
pub async fn requests(State(state): State<Arc<AppState>>) -> Json<Vec<AnalysisRequest>> {
    let requests = lock(&state.requests);
    Json(requests.iter().rev().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_bridge_core::analysis::{EventLog, WorkEvent};

    #[test]
    fn test_event_row() {
        let mut log = EventLog::default();
        log.add(WorkEvent::sleep(4));

        let row = EventRow::from(log.recent(1)[0]);
        assert_eq!(row.id, 0);
        assert_eq!(row.kind, "Sleep");
        assert_eq!(row.message, "4");
        assert_eq!(row.time.len(), "12:34:56.789".len());
    }
}
