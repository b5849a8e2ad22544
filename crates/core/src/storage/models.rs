//! Database models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSetting {
    pub key: String,
    pub value: String,
}

/// A local engine binary bound to a Lichess engine id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineBinary {
    pub engine_id: String,
    pub binary_location: String,
    /// JSON array of `{ "option": ..., "value": ... }` pairs
    pub uci_options: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UciOption {
    pub option: String,
    pub value: String,
}

impl EngineBinary {
    /// Decoded UCI options, empty when the stored JSON is unreadable
    pub fn options(&self) -> Vec<UciOption> {
        serde_json::from_str(&self.uci_options).unwrap_or_default()
    }
}
