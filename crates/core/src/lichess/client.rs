//! Lichess client for the external engine API

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Body, Client, Response, StatusCode};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::debug;

use super::types::*;
use crate::error::{Error, Result};

/// Work requests are long polls, so they outlive the default timeout
const WORK_POLL_TIMEOUT: Duration = Duration::from_secs(90);
const ANALYSIS_STREAM_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Clone)]
pub struct ExternalEngineClient {
    client: Client,
    lichess_host: String,
    engine_host: String,
    token: Option<String>,
}

impl ExternalEngineClient {
    pub fn new(lichess_host: &str, engine_host: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            lichess_host: lichess_host.trim_end_matches('/').to_string(),
            engine_host: engine_host.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(lichess_host: &str, engine_host: &str, token: String) -> Result<Self> {
        let mut client = Self::new(lichess_host, engine_host)?;
        client.token = Some(token);
        Ok(client)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref token) = self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    fn lichess_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.lichess_host, path)
    }

    fn engine_url(&self, path: &str) -> String {
        format!("{}/api/external-engine/{}", self.engine_host, path)
    }

    /// Long-polls the engine host for the next analysis request.
    ///
    /// Returns `None` when the host answers without work (any status other
    /// than 200), which callers treat as a reason to back off.
    pub async fn acquire_work(&self, provider_secret: &str) -> Result<Option<AnalysisRequest>> {
        let response = self
            .client
            .post(self.engine_url("work"))
            .json(&WorkPoll {
                provider_secret: provider_secret.to_string(),
            })
            .timeout(WORK_POLL_TIMEOUT)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            debug!("No work available: {}", response.status());
            return Ok(None);
        }

        let request: AnalysisRequest = response.json().await?;
        Ok(Some(request))
    }

    /// Streams engine output for a work id until `lines` closes or the
    /// host stops reading.
    pub async fn submit_analysis(
        &self,
        work_id: &str,
        lines: mpsc::Receiver<String>,
    ) -> Result<()> {
        let stream = ReceiverStream::new(lines).map(Ok::<String, std::io::Error>);

        let response = self
            .client
            .post(self.engine_url(&format!("work/{}", work_id)))
            .body(Body::wrap_stream(stream))
            .timeout(ANALYSIS_STREAM_TIMEOUT)
            .send()
            .await?;

        check(response, "Analysis stream rejected").await?;
        Ok(())
    }

    /// Lists the engines registered to the logged in account
    pub async fn list_engines(&self) -> Result<Vec<ExternalEngine>> {
        let response = self
            .client
            .get(self.lichess_url("external-engine"))
            .headers(self.headers())
            .send()
            .await?;

        let engines: Vec<ExternalEngine> = check(response, "Listing engines failed")
            .await?
            .json()
            .await?;
        Ok(engines)
    }

    pub async fn create_engine(&self, registration: &EngineRegistration) -> Result<ExternalEngine> {
        let response = self
            .client
            .post(self.lichess_url("external-engine"))
            .headers(self.headers())
            .json(registration)
            .send()
            .await?;

        let engine: ExternalEngine = check(response, "Registering engine failed")
            .await?
            .json()
            .await?;
        Ok(engine)
    }

    pub async fn get_engine(&self, id: &str) -> Result<ExternalEngine> {
        let response = self
            .client
            .get(self.lichess_url(&format!("external-engine/{}", id)))
            .headers(self.headers())
            .send()
            .await?;

        let engine: ExternalEngine = check(response, "Engine not found").await?.json().await?;
        Ok(engine)
    }

    pub async fn update_engine(
        &self,
        id: &str,
        registration: &EngineRegistration,
    ) -> Result<ExternalEngine> {
        let response = self
            .client
            .put(self.lichess_url(&format!("external-engine/{}", id)))
            .headers(self.headers())
            .json(registration)
            .send()
            .await?;

        let engine: ExternalEngine = check(response, "Updating engine failed")
            .await?
            .json()
            .await?;
        Ok(engine)
    }

    pub async fn delete_engine(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.lichess_url(&format!("external-engine/{}", id)))
            .headers(self.headers())
            .send()
            .await?;

        check(response, "Deleting engine failed").await?;
        Ok(())
    }

    /// Account behind the current token
    pub async fn account(&self) -> Result<LichessAccount> {
        let response = self
            .client
            .get(self.lichess_url("account"))
            .headers(self.headers())
            .send()
            .await?;

        let account: LichessAccount = check(response, "Fetching account failed")
            .await?
            .json()
            .await?;
        Ok(account)
    }
}

async fn check(response: Response, context: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    Err(Error::Lichess(format!(
        "{}: {} - {}",
        context,
        response.status(),
        response.text().await.unwrap_or_default()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client =
            ExternalEngineClient::new("https://lichess.org/", "https://engine.lichess.ovh/")
                .unwrap();

        assert_eq!(client.lichess_url("account"), "https://lichess.org/api/account");
        assert_eq!(
            client.engine_url("work/abc"),
            "https://engine.lichess.ovh/api/external-engine/work/abc"
        );
    }

    #[test]
    fn test_bearer_header() {
        let client = ExternalEngineClient::with_token(
            "https://lichess.org",
            "https://engine.lichess.ovh",
            "lip_token".into(),
        )
        .unwrap();

        let headers = client.headers();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer lip_token");

        let anonymous =
            ExternalEngineClient::new("https://lichess.org", "https://engine.lichess.ovh")
                .unwrap();
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    #[ignore] // Requires network access and a valid token
    async fn test_account() {
        let token = std::env::var("LICHESS_TOKEN").unwrap();
        let client = ExternalEngineClient::with_token(
            "https://lichess.org",
            "https://engine.lichess.ovh",
            token,
        )
        .unwrap();
        let account = client.account().await.unwrap();
        assert!(!account.username.is_empty());
    }
}
