use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use engine_bridge_core::analysis::{AnalysisState, EventLog, WorkEvent, WorkRequests};
use engine_bridge_core::{Database, Settings, Worker, STARTING_FEN};

mod routes;

const DEFAULT_DB_PATH: &str = "engine_bridge.db";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_ENGINES_DIR: &str = "engines";
const EVENT_CHANNEL_SIZE: usize = 1024;

pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub analysis: Mutex<AnalysisState>,
    /// Last position that replayed cleanly, shown while the current one fails
    pub last_good_fen: Mutex<String>,
    pub requests: Mutex<WorkRequests>,
    pub events: Mutex<EventLog>,
    /// Where downloaded engine archives are unpacked
    pub engines_dir: PathBuf,
}

impl AppState {
    fn new(db: Arc<Mutex<Database>>, engines_dir: PathBuf) -> Self {
        Self {
            db,
            analysis: Mutex::new(AnalysisState::new()),
            last_good_fen: Mutex::new(STARTING_FEN.to_string()),
            requests: Mutex::new(WorkRequests::new()),
            events: Mutex::new(EventLog::default()),
            engines_dir,
        }
    }

    /// Feeds one work-loop event through the analysis state
    pub fn apply(&self, event: WorkEvent) {
        {
            let mut analysis = lock(&self.analysis);
            analysis.handle(&event);
            if let Ok(fen) = analysis.fen() {
                *lock(&self.last_good_fen) = fen;
            }
        }

        if let Some(request) = &event.analysis_request {
            lock(&self.requests).add(request.clone());
        }
        lock(&self.events).add(event);
    }
}

/// Locks a mutex, recovering the data if a panicking handler poisoned it
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn pump_events(state: Arc<AppState>, mut events: mpsc::Receiver<WorkEvent>) {
    while let Some(event) = events.recv().await {
        state.apply(event);
    }
    debug!("Work loop closed its event channel");
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/settings", post(routes::update_setting))
        .route("/engines", get(routes::engines::engines_list))
        .route("/engines", post(routes::engines::register_engine))
        .route("/engines/delete", post(routes::engines::delete_engine))
        .route("/engines/options", post(routes::engines::set_engine_options))
        .route("/api/analysis", get(routes::api::analysis))
        .route("/api/events", get(routes::api::events))
        .route("/api/requests", get(routes::api::requests))
        .route("/health", get(routes::health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_path =
        std::env::var("ENGINE_BRIDGE_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let addr = std::env::var("ENGINE_BRIDGE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let engines_dir = std::env::var("ENGINE_BRIDGE_ENGINES")
        .unwrap_or_else(|_| DEFAULT_ENGINES_DIR.to_string());

    let db = Database::open(&db_path)?;
    Settings::ensure_defaults(&db)?;
    info!("Using database {}", db_path);

    let db = Arc::new(Mutex::new(db));
    let state = Arc::new(AppState::new(db.clone(), PathBuf::from(engines_dir)));

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
    tokio::spawn(Worker::new(db).run(tx));
    tokio::spawn(pump_events(state.clone(), rx));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard running at http://{}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
