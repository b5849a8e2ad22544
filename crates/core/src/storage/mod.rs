//! SQLite storage for settings and local engine binaries

mod db;
mod models;

pub use db::Database;
pub use models::*;
