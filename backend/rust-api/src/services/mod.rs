use std::sync::Arc;

use crate::config::Config;

use self::catalog::Catalog;
use self::gemini_service::{ExerciseProvider, GeminiService};

pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub provider: Arc<dyn ExerciseProvider>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let provider = Arc::new(GeminiService::new(&config.gemini)?);
        tracing::info!(
            "Gemini provider configured: model={}, base_url={}",
            config.gemini.model,
            config.gemini.base_url
        );
        Self::with_provider(config, provider)
    }

    /// Builds the state around an already constructed provider.
    pub fn with_provider(
        config: Config,
        provider: Arc<dyn ExerciseProvider>,
    ) -> anyhow::Result<Self> {
        let catalog = Catalog::load_embedded()?;
        Ok(Self {
            config,
            catalog,
            provider,
        })
    }
}

pub mod catalog;
pub mod gemini_service;
