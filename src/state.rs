use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, events::EventBus, storage::FileStorage};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub events: EventBus,
    pub storage: FileStorage,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: AppConfig) -> Self {
        let events = EventBus::new(config.event_bus_capacity);
        let storage = FileStorage::new(config.storage_dir.clone(), config.public_base_url.clone());
        Self {
            orm,
            config: Arc::new(config),
            events,
            storage,
        }
    }
}
