use std::sync::Arc;

use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::controller::{EventController, SystemClock};
use crate::presentation::{PlainFormatter, StoredSurface};
use crate::repository::EventRepository;
use crate::store::{InMemoryStore, KeyValueStore, PostgresStore, StoreError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller: EventController,
    pub surface: Arc<StoredSurface>,
}

impl AppState {
    /// Events and the messages announcing them share `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let surface = Arc::new(StoredSurface::new(store.clone()));
        let controller = EventController::new(
            EventRepository::new(store),
            surface.clone(),
            Arc::new(PlainFormatter),
            Arc::new(SystemClock),
        );
        Self {
            controller,
            surface,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        Ok(Self::new(open_store(config).await?))
    }
}

pub async fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    info!("Store backend: {:?}", config.store_backend);

    match config.store_backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        StoreBackend::Postgres => Ok(Arc::new(
            PostgresStore::connect(&config.database_url, config.max_connections).await?,
        )),
        #[cfg(feature = "dynamo")]
        StoreBackend::Dynamo => Ok(Arc::new(
            crate::store::DynamoStore::new(
                config.table_name.clone(),
                config.region.as_deref(),
                config.dynamo_endpoint.as_deref(),
            )
            .await?,
        )),
        #[cfg(not(feature = "dynamo"))]
        StoreBackend::Dynamo => Err(StoreError::Backend {
            operation: "connect",
            message: "DynamoDB requested but the 'dynamo' feature is not enabled".to_string(),
        }),
    }
}
