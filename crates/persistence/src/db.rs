//! Postgres pool setup and schema migrations for the request store.

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::repositories::PgRequestRepository;

/// Migrations embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./src/migrations");

/// Pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Open a pool without touching the schema.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating database pool"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(&config.url)
        .await
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");
    MIGRATOR.run(pool).await?;
    info!("Migrations completed");
    Ok(())
}

/// Open the pool, bring the schema up to date and wrap it in a repository.
pub async fn connect(config: &DatabaseConfig) -> Result<PgRequestRepository, sqlx::Error> {
    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    Ok(PgRequestRepository::new(pool))
}
