//! Analysis session state driven by work-loop events

mod event;
mod log;
mod state;
mod view;

pub use crate::lichess::AnalysisRequest;
pub use event::{EventKind, WorkEvent};
pub use log::{EventLog, LoggedEvent, WorkRequests};
pub use state::{AnalysisState, SLEEPING};
pub use view::AnalysisView;
