//! Lichess external engine API
//!
//! Work polling, analysis streaming and engine registration.

mod client;
mod types;

pub use client::ExternalEngineClient;
pub use types::*;
