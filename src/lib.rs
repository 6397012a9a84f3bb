pub mod auth;
pub mod compose;
pub mod config;
pub mod drafts;
pub mod error;
pub mod imports;
pub mod models;
pub mod outreach;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;
pub mod utils;

use std::sync::Arc;

use anyhow::Result;

use crate::config::AppConfig;
use crate::drafts::{DraftGenerator, GeminiBackend, OfflineBackend};

/// Gemini when an API key is configured, the offline fallback otherwise.
pub fn build_draft_generator(config: &AppConfig) -> Result<DraftGenerator> {
    let generator = match GeminiBackend::from_config(config)? {
        Some(backend) => DraftGenerator::new(Arc::new(backend), config.platform_name.clone()),
        None => DraftGenerator::new(
            Arc::new(OfflineBackend::new(config.platform_name.clone())),
            config.platform_name.clone(),
        ),
    };
    Ok(generator)
}
