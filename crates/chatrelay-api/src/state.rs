//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Core services are generic over store/inference traits; AppState pins them
//! to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use chatrelay_core::catalog::service::CatalogService;
use chatrelay_core::session::SessionSettings;
use chatrelay_core::session::hub::SessionHub;
use chatrelay_infra::inference::http::HttpInferenceClient;
use chatrelay_infra::sqlite::catalog::SqliteCatalogStore;
use chatrelay_infra::sqlite::pool::DatabasePool;
use chatrelay_infra::sqlite::session_log::SqliteSessionLogStore;
use chatrelay_types::config::RelayConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteSessionHub = SessionHub<SqliteSessionLogStore, HttpInferenceClient>;

pub type ConcreteCatalogService = CatalogService<SqliteCatalogStore>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ConcreteSessionHub>,
    pub catalog: Arc<ConcreteCatalogService>,
    pub session_logs: Arc<SqliteSessionLogStore>,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init(data_dir: PathBuf, config: RelayConfig) -> anyhow::Result<Self> {
        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::open_in(&data_dir).await?;
        let inference = HttpInferenceClient::from_config(&config.inference)?;
        if inference.endpoint().is_none() {
            tracing::warn!("No inference endpoint configured, every reply will be a fallback message");
        }

        let session_logs = Arc::new(SqliteSessionLogStore::new(db_pool.clone()));
        let hub = SessionHub::new(
            session_logs.clone(),
            Arc::new(inference),
            SessionSettings::from_config(&config),
        );
        let catalog = CatalogService::new(Arc::new(SqliteCatalogStore::new(db_pool)));

        tracing::debug!(data_dir = %data_dir.display(), "Application state initialized");

        Ok(Self {
            hub: Arc::new(hub),
            catalog: Arc::new(catalog),
            session_logs,
            config: Arc::new(config),
        })
    }
}
