use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use engine_bridge_core::analysis::AnalysisView;
use engine_bridge_core::settings::{ENGINE_HOST, LICHESS_HOST, LICHESS_TOKEN, LICHESS_USERNAME};
use engine_bridge_core::{ExternalEngineClient, Settings};

use crate::{lock, AppState};

pub mod api;
pub mod engines;

/// Number of log lines shown on the dashboard
const DASHBOARD_EVENTS: usize = 30;

/// Core errors rendered as a plain 500 response
pub struct AppError(engine_bridge_core::Error);

impl From<engine_bridge_core::Error> for AppError {
    fn from(error: engine_bridge_core::Error) -> Self {
        AppError(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub view: AnalysisView,
    pub settings: Settings,
    pub logged_in: bool,
    pub events: Vec<api::EventRow>,
}

#[derive(serde::Deserialize)]
pub struct SettingForm {
    pub key: String,
    pub value: String,
}

/// Current analysis view, built under the state locks
pub fn current_view(state: &AppState) -> AnalysisView {
    let analysis = lock(&state.analysis);
    let last_good_fen = lock(&state.last_good_fen);
    AnalysisView::new(&analysis, &last_good_fen)
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let settings = Settings::load(&lock(&state.db))?;
    let events = api::event_rows(&state, DASHBOARD_EVENTS);

    let template = IndexTemplate {
        title: "Engine Bridge".to_string(),
        view: current_view(&state),
        logged_in: settings.lichess_token.is_some(),
        settings,
        events,
    };
    Ok(askama_axum::into_response(&template))
}

/// Updates one user-editable setting.
///
/// Saving a token also looks up the account so the dashboard can show who
/// is logged in; an empty token logs out.
pub async fn update_setting(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SettingForm>,
) -> Result<Redirect, AppError> {
    let key = form.key.trim();
    let value = form.value.trim().to_string();

    if ![LICHESS_HOST, ENGINE_HOST, LICHESS_TOKEN].contains(&key) {
        warn!("Ignoring update of unknown setting '{}'", key);
        return Ok(Redirect::to("/"));
    }

    if key == LICHESS_TOKEN {
        if value.is_empty() {
            let db = lock(&state.db);
            db.delete_setting(LICHESS_TOKEN)?;
            db.delete_setting(LICHESS_USERNAME)?;
            info!("Logged out of Lichess");
            return Ok(Redirect::to("/"));
        }

        let settings = Settings::load(&lock(&state.db))?;
        let client = ExternalEngineClient::with_token(
            &settings.lichess_host,
            &settings.engine_host,
            value.clone(),
        )?;
        let account = client.account().await?;
        info!("Logged in to Lichess as {}", account.username);

        let db = lock(&state.db);
        db.update_setting(LICHESS_TOKEN, &value)?;
        db.update_setting(LICHESS_USERNAME, &account.username)?;
        return Ok(Redirect::to("/"));
    }

    lock(&state.db).update_setting(key, &value)?;
    info!("Updated setting {}", key);
    Ok(Redirect::to("/"))
}

pub async fn health() -> &'static str {
    "OK"
}
