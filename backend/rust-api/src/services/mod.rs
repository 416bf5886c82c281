use std::sync::Arc;

use crate::config::Config;
use crate::services::ids::{IdGenerator, SequentialIds};
use crate::services::session_service::SessionStore;
use crate::services::storage::MemStorage;

pub struct AppState {
    pub config: Config,
    pub storage: MemStorage,
    pub sessions: SessionStore,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_id_generator(config, Arc::new(SequentialIds::new())).await
    }

    /// Builds the state around a caller-supplied id sequence.
    pub async fn with_id_generator(
        config: Config,
        ids: Arc<dyn IdGenerator>,
    ) -> anyhow::Result<Self> {
        if config.session.ttl_seconds <= 0 {
            anyhow::bail!(
                "session.ttl_seconds must be positive, got {}",
                config.session.ttl_seconds
            );
        }

        let storage = MemStorage::new(ids);
        seed::bootstrap(&config, &storage).await?;

        let sessions = SessionStore::new(chrono::Duration::seconds(config.session.ttl_seconds));

        tracing::info!(
            "Store ready: {} stages, session ttl {}s",
            storage.get_all_stages().len(),
            config.session.ttl_seconds
        );

        Ok(Self {
            config,
            storage,
            sessions,
        })
    }
}

pub mod ids;
pub mod seed;
pub mod session_service;
pub mod storage;
