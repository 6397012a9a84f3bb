use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{config::AppConfig, drafts::DraftGenerator, seed::SeedData, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub config: Arc<AppConfig>,
    pub drafts: DraftGenerator,
}

impl AppState {
    pub fn new(config: AppConfig, seed: SeedData, drafts: DraftGenerator) -> Self {
        let store = Store::new(seed, config.store_settings());
        Self {
            store: Arc::new(RwLock::new(store)),
            config: Arc::new(config),
            drafts,
        }
    }
}
