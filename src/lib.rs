pub mod api;
pub mod clustering;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod explorer;
pub mod models;
pub mod query;


pub use api::*;
pub use constants::*;
pub use db::{AnalyticsStore, DatabaseConnection, MemoryStore, MySqlStore};
pub use error::*;
pub use models::*;
pub use query::*;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
