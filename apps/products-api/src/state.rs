//! Application state management

use database::postgres::DatabaseConnection;

/// Shared application state, cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
}
