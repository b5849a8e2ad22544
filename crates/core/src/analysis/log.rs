//! Bounded histories kept next to the analysis state

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use super::event::WorkEvent;
use crate::lichess::AnalysisRequest;

const DEFAULT_CAPACITY: usize = 500;

/// Most recent requests received from Lichess, oldest first
#[derive(Debug)]
pub struct WorkRequests {
    capacity: usize,
    requests: VecDeque<AnalysisRequest>,
}

impl WorkRequests {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            requests: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends `request`, dropping the oldest one when full
    pub fn add(&mut self, request: AnalysisRequest) {
        if self.requests.len() == self.capacity {
            self.requests.pop_front();
        }
        self.requests.push_back(request);
    }

    pub fn latest(&self) -> Option<&AnalysisRequest> {
        self.requests.back()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, AnalysisRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl Default for WorkRequests {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedEvent {
    pub id: u64,
    /// Unix time in milliseconds
    pub received_at: u64,
    pub event: WorkEvent,
}

/// Ring buffer of the most recent events
#[derive(Debug)]
pub struct EventLog {
    capacity: usize,
    next_id: u64,
    entries: VecDeque<LoggedEvent>,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: 0,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, event: WorkEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LoggedEvent {
            id,
            received_at: now_millis(),
            event,
        });
        id
    }

    /// Up to `n` newest events, newest first
    pub fn recent(&self, n: usize) -> Vec<&LoggedEvent> {
        self.entries.iter().rev().take(n).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_drops_oldest() {
        let mut log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.add(WorkEvent::protocol_line(format!("info depth {}", i)));
        }

        assert_eq!(log.len(), 3);
        let ids: Vec<u64> = log.recent(10).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 3, 2]);
        assert_eq!(log.recent(1)[0].event.message, "info depth 4");
    }

    #[test]
    fn test_event_log_timestamps() {
        let mut log = EventLog::default();
        log.add(WorkEvent::status("Waiting for moves"));
        assert!(log.recent(1)[0].received_at > 0);
    }

    fn request(id: &str) -> AnalysisRequest {
        let json = format!(
            r#"{{
                "id": "{}",
                "work": {{
                    "sessionId": "s", "threads": 1, "hash": 16, "multiPv": 1,
                    "variant": "chess", "moves": ["e2e4"]
                }},
                "engine": {{
                    "id": "eei_1", "name": "Stockfish", "clientSecret": "ees_x",
                    "userId": "me", "maxThreads": 1, "maxHash": 16, "defaultDepth": 20
                }}
            }}"#,
            id
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_work_requests_drop_oldest() {
        let mut requests = WorkRequests::with_capacity(2);
        for id in ["w1", "w2", "w3"] {
            requests.add(request(id));
        }

        assert_eq!(requests.len(), 2);
        let ids: Vec<&str> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["w2", "w3"]);
        assert_eq!(requests.latest().map(|r| r.id.as_str()), Some("w3"));
    }

    #[test]
    fn test_work_requests_empty() {
        let requests = WorkRequests::new();
        assert!(requests.is_empty());
        assert!(requests.latest().is_none());
        assert_eq!(requests.iter().count(), 0);
    }
}
