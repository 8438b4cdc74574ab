use crate::config::Config;
use crate::db::Store;
use crate::services::{AccessControl, FeedService, MediaStorage, SessionKeys};
use std::sync::Arc;

/// Shared application state handed to every handler as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub media: MediaStorage,
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            media: MediaStorage::new(&config.media),
            sessions: SessionKeys::new(&config.session),
            config: Arc::new(config),
            store,
        }
    }

    pub fn feed(&self) -> FeedService {
        FeedService::new(self.store.clone())
    }

    pub fn access(&self) -> AccessControl {
        AccessControl::new(self.store.clone())
    }
}
