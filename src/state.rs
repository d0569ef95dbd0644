use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;

use crate::{
    clients::{
        AiEngine, HttpAiEngine, ImageStore, OpenFoodFactsClient, ProductCatalog, SupabaseStorage,
    },
    config::{AppConfig, JwtConfig},
};

/// Process-wide dependencies, built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub jwt: Arc<JwtConfig>,
    pub ai: Arc<dyn AiEngine>,
    pub storage: Arc<dyn ImageStore>,
    pub catalog: Arc<dyn ProductCatalog>,
}

impl AppState {
    pub fn from_config(orm: DatabaseConnection, config: &AppConfig) -> anyhow::Result<Self> {
        let services = &config.services;
        Ok(Self {
            orm,
            jwt: Arc::new(config.jwt.clone()),
            ai: Arc::new(
                HttpAiEngine::new(&services.ai_service_url).context("building AI client")?,
            ),
            storage: Arc::new(
                SupabaseStorage::new(
                    &services.supabase_url,
                    &services.supabase_key,
                    &services.bucket_name,
                )
                .context("building storage client")?,
            ),
            catalog: Arc::new(
                OpenFoodFactsClient::new(&services.open_food_facts_url)
                    .context("building catalog client")?,
            ),
        })
    }
}
