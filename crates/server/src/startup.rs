use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use service::auth::TokenManager;
use service::{MemoryStore, SeaOrmStore, Services};
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Wire the core services onto the store selected by `database.url`.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let tokens = TokenManager::from_config(&cfg.auth).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let services = if cfg.database.is_memory() {
        warn!("using the in-memory store; data is lost on exit");
        Services::from_store(Arc::new(MemoryStore::new()), tokens)
    } else {
        let db = models::db::connect_with_config(&cfg.database)
            .await
            .map_err(|e| StartupError::Database(e.to_string()))?;
        if cfg.database.run_migrations {
            migration::Migrator::up(&db, None).await.map_err(|e| StartupError::Database(e.to_string()))?;
            info!("migrations applied");
        }
        Services::from_store(Arc::new(SeaOrmStore::new(db)), tokens)
    };
    Ok(AppState::new(services))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Public entry: load config, build the app and run the HTTP server
pub async fn run() -> Result<(), StartupError> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    common::utils::logging::init_logging(cfg.logging.format);

    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}
