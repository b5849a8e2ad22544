//! Application settings backed by the settings table

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::storage::Database;

pub const LICHESS_HOST: &str = "lichess_host";
pub const ENGINE_HOST: &str = "engine_host";
pub const PROVIDER_SECRET: &str = "provider_secret";
pub const LICHESS_TOKEN: &str = "lichess_token";
pub const LICHESS_USERNAME: &str = "lichess_username";

pub const DEFAULT_LICHESS_HOST: &str = "https://lichess.org";
pub const DEFAULT_ENGINE_HOST: &str = "https://engine.lichess.ovh";

const PROVIDER_SECRET_LEN: usize = 128;

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub lichess_host: String,
    pub engine_host: String,
    #[serde(skip_serializing)]
    pub provider_secret: Option<String>,
    #[serde(skip_serializing)]
    pub lichess_token: Option<String>,
    pub lichess_username: Option<String>,
}

impl Settings {
    /// Seeds the hosts and a fresh provider secret on first start
    pub fn ensure_defaults(db: &Database) -> Result<()> {
        db.add_default_setting(LICHESS_HOST, DEFAULT_LICHESS_HOST)?;
        db.add_default_setting(ENGINE_HOST, DEFAULT_ENGINE_HOST)?;
        db.add_default_setting(PROVIDER_SECRET, &generate_provider_secret())?;
        Ok(())
    }

    pub fn load(db: &Database) -> Result<Self> {
        Ok(Self {
            lichess_host: db
                .get_setting(LICHESS_HOST)?
                .unwrap_or_else(|| DEFAULT_LICHESS_HOST.to_string()),
            engine_host: db
                .get_setting(ENGINE_HOST)?
                .unwrap_or_else(|| DEFAULT_ENGINE_HOST.to_string()),
            provider_secret: non_empty(db.get_setting(PROVIDER_SECRET)?),
            lichess_token: non_empty(db.get_setting(LICHESS_TOKEN)?),
            lichess_username: non_empty(db.get_setting(LICHESS_USERNAME)?),
        })
    }

    pub fn token(&self) -> Result<&str> {
        self.lichess_token.as_deref().ok_or(Error::MissingSetting(LICHESS_TOKEN))
    }

    pub fn provider_secret(&self) -> Result<&str> {
        self.provider_secret
            .as_deref()
            .ok_or(Error::MissingSetting(PROVIDER_SECRET))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Secret shared with Lichess so only this provider receives our work
pub fn generate_provider_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(PROVIDER_SECRET_LEN)
        .map(char::from)
        .collect()
}
