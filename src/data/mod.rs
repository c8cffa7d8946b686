//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite record store (one file per client)
//! - Registry of open client stores

mod database;
mod models;
mod stores;

pub use database::Database;
pub use models::*;
pub use stores::{ClientId, ClientStores, StoreLimits};
