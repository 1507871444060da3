use anyhow::Result;
use domain::memory::InMemoryRequestRepository;
use domain::repository::RequestRepository;
use std::sync::Arc;
use tracing::{info, warn};

use maintenance_tracker_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Maintenance Tracker API v{}", env!("CARGO_PKG_VERSION"));

    let repository: Arc<dyn RequestRepository> = if config.database.is_configured() {
        let db_config = persistence::db::DatabaseConfig::from(&config.database);
        Arc::new(persistence::db::connect(&db_config).await?)
    } else {
        warn!("No database URL configured, using in-memory storage");
        Arc::new(InMemoryRequestRepository::new())
    };

    let app = app::create_app(config.clone(), repository);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
