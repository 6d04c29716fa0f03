//! Configuration for Products API

use core_config::{AppInfo, FromEnv, app_info, env_parse, server::ServerConfig};
use database::{RetryConfig, postgres::PostgresConfig};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Apply pending migrations before serving (`DB_RUN_MIGRATIONS`, default true)
    pub run_migrations: bool,
    /// Startup connection backoff (`DB_CONNECT_MAX_RETRIES`,
    /// `DB_CONNECT_INITIAL_DELAY_MS`, `DB_CONNECT_MAX_DELAY_MS`)
    pub connect_retry: RetryConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let run_migrations = env_parse("DB_RUN_MIGRATIONS", "true")?;
        let connect_retry = RetryConfig::new()
            .with_max_retries(env_parse("DB_CONNECT_MAX_RETRIES", "5")?)
            .with_initial_delay(env_parse("DB_CONNECT_INITIAL_DELAY_MS", "200")?)
            .with_max_delay(env_parse("DB_CONNECT_MAX_DELAY_MS", "5000")?);

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            run_migrations,
            connect_retry,
        })
    }
}
