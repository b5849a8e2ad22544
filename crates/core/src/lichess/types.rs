//! Lichess external engine API data types

use serde::{Deserialize, Serialize};

/// One unit of analysis work assigned by the engine host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub id: String,
    pub work: Work,
    pub engine: ExternalEngine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub session_id: String,
    pub threads: u32,
    pub hash: u32,
    #[serde(default)]
    pub infinite: bool,
    pub multi_pv: u32,
    pub variant: String,
    #[serde(default)]
    pub initial_fen: String,
    #[serde(default)]
    pub moves: Vec<String>,
    #[serde(default)]
    pub movetime: Option<u32>,
    #[serde(default)]
    pub depth: Option<u32>,
}

/// An engine registration as stored by Lichess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalEngine {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub max_threads: u32,
    pub max_hash: u32,
    pub default_depth: u32,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub provider_data: Option<String>,
    pub client_secret: String,
}

/// Body for creating or updating an engine registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRegistration {
    pub name: String,
    pub max_threads: u32,
    pub max_hash: u32,
    pub default_depth: u32,
    pub variants: Vec<String>,
    pub provider_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_data: Option<String>,
}

impl EngineRegistration {
    pub fn new(name: impl Into<String>, provider_secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_threads: 1,
            max_hash: 16,
            default_depth: 25,
            variants: vec!["chess".to_string()],
            provider_secret: provider_secret.into(),
            provider_data: None,
        }
    }

    pub fn max_threads(mut self, max_threads: u32) -> Self {
        self.max_threads = max_threads;
        self
    }

    pub fn max_hash(mut self, max_hash: u32) -> Self {
        self.max_hash = max_hash;
        self
    }

    pub fn default_depth(mut self, depth: u32) -> Self {
        self.default_depth = depth;
        self
    }

    pub fn variants(mut self, variants: Vec<String>) -> Self {
        self.variants = variants;
        self
    }

    pub fn provider_data(mut self, data: impl Into<String>) -> Self {
        self.provider_data = Some(data.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPoll {
    pub provider_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LichessAccount {
    pub id: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST_JSON: &str = r#"{
        "id": "aBcDeFgH",
        "work": {
            "sessionId": "s3ss10n",
            "threads": 4,
            "hash": 256,
            "infinite": true,
            "multiPv": 1,
            "variant": "chess",
            "initialFen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "moves": ["e2e4", "e7e5"]
        },
        "engine": {
            "id": "eei_1234",
            "name": "Stockfish 16",
            "clientSecret": "ees_secret",
            "userId": "someone",
            "maxThreads": 8,
            "maxHash": 2048,
            "defaultDepth": 25,
            "variants": ["chess"],
            "providerData": null
        }
    }"#;

    #[test]
    fn test_deserialize_analysis_request() {
        let request: AnalysisRequest = serde_json::from_str(REQUEST_JSON).unwrap();

        assert_eq!(request.id, "aBcDeFgH");
        assert_eq!(request.work.session_id, "s3ss10n");
        assert!(request.work.infinite);
        assert_eq!(request.work.multi_pv, 1);
        assert_eq!(request.work.moves, vec!["e2e4", "e7e5"]);
        assert_eq!(request.work.movetime, None);
        assert_eq!(request.engine.id, "eei_1234");
        assert_eq!(request.engine.max_hash, 2048);
        assert_eq!(request.engine.provider_data, None);
    }

    #[test]
    fn test_serialize_registration() {
        let registration = EngineRegistration::new("Stockfish", "secret")
            .max_threads(4)
            .variants(vec!["chess".into(), "atomic".into()]);

        let json = serde_json::to_value(&registration).unwrap();
        assert_eq!(json["maxThreads"], 4);
        assert_eq!(json["providerSecret"], "secret");
        assert_eq!(json["variants"][1], "atomic");
        assert!(json.get("providerData").is_none());
    }
}
