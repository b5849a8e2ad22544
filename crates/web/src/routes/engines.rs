use askama::Template;
use axum::{
    extract::State,
    response::{Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use engine_bridge_core::engine::directory::{self, EngineDownload};
use engine_bridge_core::lichess::{EngineRegistration, ExternalEngine};
use engine_bridge_core::storage::{EngineBinary, UciOption};
use engine_bridge_core::{ExternalEngineClient, Settings};

use super::AppError;
use crate::{lock, AppState};

// ============================================================================
// TEMPLATES
// ============================================================================

#[derive(Template)]
#[template(path = "engines.html")]
pub struct EnginesTemplate {
    pub title: String,
    pub local: Vec<LocalEngineRow>,
    pub remote: Vec<ExternalEngine>,
    pub remote_error: Option<String>,
    pub logged_in: bool,
}

pub struct LocalEngineRow {
    pub engine_id: String,
    pub binary_location: String,
    /// One `Name=Value` pair per line
    pub options: String,
}

impl From<EngineBinary> for LocalEngineRow {
    fn from(engine: EngineBinary) -> Self {
        let options = engine
            .options()
            .iter()
            .map(|o| format!("{}={}", o.option, o.value))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            engine_id: engine.engine_id,
            binary_location: engine.binary_location,
            options,
        }
    }
}

// ============================================================================
// FORMS
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    #[serde(default)]
    pub binary_location: String,
    /// Zip archive to download instead of using a local path
    #[serde(default)]
    pub zip_url: String,
    /// Path of the executable inside the archive
    #[serde(default)]
    pub binary_filename: String,
    pub max_threads: u32,
    pub max_hash: u32,
    pub default_depth: u32,
    /// Comma separated, e.g. "chess, atomic"
    pub variants: String,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    pub engine_id: String,
}

#[derive(Deserialize)]
pub struct OptionsForm {
    pub engine_id: String,
    #[serde(default)]
    pub options: String,
}

/// Reads `Name=Value` lines, skipping blank or malformed ones
fn parse_options(text: &str) -> Vec<UciOption> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(option, value)| UciOption {
            option: option.trim().to_string(),
            value: value.trim().to_string(),
        })
        .filter(|o| !o.option.is_empty())
        .collect()
}

fn parse_variants(variants: &str) -> Vec<String> {
    let parsed: Vec<String> = variants
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    if parsed.is_empty() {
        vec!["chess".to_string()]
    } else {
        parsed
    }
}

/// Directory name for a downloaded engine, safe to join onto the engines folder
fn folder_name(engine_name: &str) -> String {
    let name: String = engine_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if name.is_empty() {
        "engine".to_string()
    } else {
        name
    }
}

/// Client for the logged in account, `None` without a token
fn authorized_client(
    state: &AppState,
) -> Result<Option<(ExternalEngineClient, Settings)>, AppError> {
    let settings = Settings::load(&lock(&state.db))?;
    let Some(token) = settings.lichess_token.clone() else {
        return Ok(None);
    };
    let client =
        ExternalEngineClient::with_token(&settings.lichess_host, &settings.engine_host, token)?;
    Ok(Some((client, settings)))
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn engines_list(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let local = lock(&state.db)
        .get_all_engines()?
        .into_iter()
        .map(LocalEngineRow::from)
        .collect();

    let mut remote = Vec::new();
    let mut remote_error = None;
    let client = authorized_client(&state)?;
    let logged_in = client.is_some();

    if let Some((client, _)) = client {
        match client.list_engines().await {
            Ok(engines) => remote = engines,
            Err(e) => {
                warn!("Could not list registered engines: {}", e);
                remote_error = Some(e.to_string());
            }
        }
    }

    let template = EnginesTemplate {
        title: "Engines".to_string(),
        local,
        remote,
        remote_error,
        logged_in,
    };
    Ok(askama_axum::into_response(&template))
}

/// Registers the engine with Lichess and remembers where its binary lives
pub async fn register_engine(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    let zip_url = form.zip_url.trim();
    let has_binary = !form.binary_location.trim().is_empty() || !zip_url.is_empty();
    if form.name.trim().is_empty() || !has_binary {
        warn!("Engine registration needs a name and a binary path or download");
        return Ok(Redirect::to("/engines"));
    }

    let Some((client, settings)) = authorized_client(&state)? else {
        warn!("Cannot register an engine before logging in");
        return Ok(Redirect::to("/engines"));
    };

    let binary_location = if zip_url.is_empty() {
        form.binary_location.trim().to_string()
    } else {
        let download = EngineDownload {
            zip: zip_url.to_string(),
            binary_filename: form.binary_filename.trim().to_string(),
        };
        let folder = state.engines_dir.join(folder_name(&form.name));
        let binary = directory::download_to_folder(&download, &folder).await?;
        binary.to_string_lossy().into_owned()
    };

    let registration = EngineRegistration::new(form.name.trim(), settings.provider_secret()?)
        .max_threads(form.max_threads)
        .max_hash(form.max_hash)
        .default_depth(form.default_depth)
        .variants(parse_variants(&form.variants));

    let engine = client.create_engine(&registration).await?;
    lock(&state.db).add_engine(&engine.id, &binary_location)?;
    info!(
        "Registered engine {} ({}) at {}",
        engine.name, engine.id, binary_location
    );

    Ok(Redirect::to("/engines"))
}

/// Forgets the local binary and removes the Lichess registration
pub async fn delete_engine(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    if let Some((client, _)) = authorized_client(&state)? {
        if let Err(e) = client.delete_engine(&form.engine_id).await {
            warn!("Could not delete engine {} on Lichess: {}", form.engine_id, e);
        }
    }

    lock(&state.db).delete_engine(&form.engine_id)?;
    info!("Deleted engine {}", form.engine_id);
    Ok(Redirect::to("/engines"))
}

/// Replaces the UCI options sent to the engine before each search
pub async fn set_engine_options(
    State(state): State<Arc<AppState>>,
    Form(form): Form<OptionsForm>,
) -> Result<Redirect, AppError> {
    let options = parse_options(&form.options);
    lock(&state.db).set_engine_options(&form.engine_id, &options)?;
    info!("Saved {} options for engine {}", options.len(), form.engine_id);
    Ok(Redirect::to("/engines"))
}
