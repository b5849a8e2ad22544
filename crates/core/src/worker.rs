//! Work loop: long-polls Lichess for analysis requests and runs them on a
//! local engine, reporting progress as [`WorkEvent`]s.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::analysis::WorkEvent;
use crate::engine::EngineProcess;
use crate::error::Result;
use crate::lichess::{AnalysisRequest, ExternalEngineClient};
use crate::settings::Settings;
use crate::storage::{Database, EngineBinary};

pub const WAITING_FOR_LOGIN: &str = "Waiting for Lichess login";
pub const MISSING_PROVIDER_SECRET: &str = "Missing provider secret";
pub const MISSING_ENGINE_HOST: &str = "Missing engine host setting";
pub const WAITING_FOR_ENGINE: &str = "Waiting for engine to be added";
pub const WAITING_FOR_MOVES: &str = "Waiting for moves";
pub const ANALYZING: &str = "Analyzing";
pub const MISSING_BINARY: &str = "Missing binary filepath";

const STARTUP_DELAY: Duration = Duration::from_secs(3);
const RETRY_DELAY: Duration = Duration::from_secs(5);
const INITIAL_BACKOFF_SECS: u64 = 1;
const MAX_BACKOFF_SECS: u64 = 10;
const ANALYSIS_BUFFER: usize = 256;

/// Exponential backoff between empty work polls
#[derive(Debug, Clone)]
pub struct Backoff {
    secs: u64,
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    /// Delay to wait now; doubles the next one up to the cap
    pub fn next_delay(&mut self) -> u64 {
        let current = self.secs;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
        current
    }

    pub fn reset(&mut self) {
        self.secs = INITIAL_BACKOFF_SECS;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

/// What the loop needs before it can ask for work
enum Readiness {
    Ready {
        client: ExternalEngineClient,
        provider_secret: String,
    },
    Waiting(&'static str),
}

pub struct Worker {
    db: Arc<Mutex<Database>>,
    startup_delay: Duration,
}

impl Worker {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self {
            db,
            startup_delay: STARTUP_DELAY,
        }
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs until the event receiver is dropped
    pub async fn run(self, events: mpsc::Sender<WorkEvent>) {
        info!("Work loop starting");
        sleep(self.startup_delay).await;

        let mut backoff = Backoff::new();
        while !events.is_closed() {
            if let Err(e) = self.poll_once(&events, &mut backoff).await {
                error!("Work loop error: {}", e);
                emit(&events, WorkEvent::status(e.to_string())).await;
                sleep(RETRY_DELAY).await;
            }
        }
        info!("Event receiver closed, work loop stopped");
    }

    fn readiness(&self) -> Result<Readiness> {
        let db = self.db();
        let settings = Settings::load(&db)?;

        let token = match settings.token() {
            Ok(token) => token.to_string(),
            Err(_) => return Ok(Readiness::Waiting(WAITING_FOR_LOGIN)),
        };
        let provider_secret = match settings.provider_secret() {
            Ok(secret) => secret.to_string(),
            Err(_) => return Ok(Readiness::Waiting(MISSING_PROVIDER_SECRET)),
        };
        if settings.engine_host.trim().is_empty() {
            return Ok(Readiness::Waiting(MISSING_ENGINE_HOST));
        }
        if db.count_engines()? == 0 {
            return Ok(Readiness::Waiting(WAITING_FOR_ENGINE));
        }

        let client =
            ExternalEngineClient::with_token(&settings.lichess_host, &settings.engine_host, token)?;
        Ok(Readiness::Ready {
            client,
            provider_secret,
        })
    }

    async fn poll_once(
        &self,
        events: &mpsc::Sender<WorkEvent>,
        backoff: &mut Backoff,
    ) -> Result<()> {
        let readiness = self.readiness()?;
        let (client, provider_secret) = match readiness {
            Readiness::Ready {
                client,
                provider_secret,
            } => (client, provider_secret),
            Readiness::Waiting(reason) => {
                emit(events, WorkEvent::status(reason)).await;
                sleep(RETRY_DELAY).await;
                return Ok(());
            }
        };

        emit(events, WorkEvent::status(WAITING_FOR_MOVES)).await;

        let request = match client.acquire_work(&provider_secret).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                back_off(events, backoff).await;
                return Ok(());
            }
            Err(e) => {
                warn!("Polling for work failed: {}", e);
                back_off(events, backoff).await;
                return Ok(());
            }
        };
        backoff.reset();

        info!(
            "Received work {} for engine {} ({} moves)",
            request.id,
            request.engine.id,
            request.work.moves.len()
        );
        emit(events, WorkEvent::status(ANALYZING).with_request(request.clone())).await;

        let binary = self.db().get_engine(&request.engine.id)?;
        let Some(binary) = binary else {
            warn!("No local binary registered for engine {}", request.engine.id);
            emit(events, WorkEvent::status(MISSING_BINARY)).await;
            sleep(RETRY_DELAY).await;
            return Ok(());
        };

        analyze(&client, &request, &binary, events).await
    }
}

async fn emit(events: &mpsc::Sender<WorkEvent>, event: WorkEvent) {
    debug!("event: {:?} | {}", event.event, event.message);
    if events.send(event).await.is_err() {
        debug!("Dropping event, receiver closed");
    }
}

async fn back_off(events: &mpsc::Sender<WorkEvent>, backoff: &mut Backoff) {
    let secs = backoff.next_delay();
    debug!("Backing off for {}s", secs);
    emit(events, WorkEvent::sleep(secs)).await;
    sleep(Duration::from_secs(secs)).await;
}

/// Runs one search, streaming `info` lines to Lichess until the engine
/// prints `bestmove` or Lichess stops reading.
async fn analyze(
    client: &ExternalEngineClient,
    request: &AnalysisRequest,
    binary: &EngineBinary,
    events: &mpsc::Sender<WorkEvent>,
) -> Result<()> {
    let mut engine = match EngineProcess::spawn(&binary.binary_location) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            emit(events, WorkEvent::status(e.to_string())).await;
            sleep(RETRY_DELAY).await;
            return Ok(());
        }
    };

    engine.set_options(&binary.options()).await?;
    engine.start_search(request).await?;

    let (tx, rx) = mpsc::channel::<String>(ANALYSIS_BUFFER);
    let upload_client = client.clone();
    let work_id = request.id.clone();
    tokio::spawn(async move {
        if let Err(e) = upload_client.submit_analysis(&work_id, rx).await {
            warn!("Analysis stream for {} ended: {}", work_id, e);
        }
    });

    let mut finished = false;
    while let Some(line) = engine.next_line().await? {
        emit(events, WorkEvent::protocol_line(line.as_str())).await;

        if line.starts_with("info") {
            if tx.send(format!("{}\n", line)).await.is_err() {
                debug!("Lichess stopped reading analysis for {}", request.id);
                break;
            }
        } else if line.starts_with("bestmove") {
            finished = true;
            break;
        }
    }
    drop(tx);

    if !finished {
        if let Err(e) = engine.stop().await {
            debug!("Engine did not accept stop: {}", e);
        }
    }
    engine.quit().await?;
    Ok(())
}
