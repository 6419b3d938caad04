use std::sync::Arc;

use processo_core::{Config, ExtractionPipeline, OpenAiClient, Rasterizer, SummarizationClient};

use crate::artifacts::ArtifactStore;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub pipeline: ExtractionPipeline,
    /// Renders the structured page for the preview image.
    pub rasterizer: Box<dyn Rasterizer>,
    pub summarizer: Arc<dyn SummarizationClient>,
    pub artifacts: ArtifactStore,
}

impl AppState {
    pub fn from_config(config: &Config) -> std::io::Result<Self> {
        Ok(Self {
            pipeline: processo_ingest::default_pipeline(config),
            rasterizer: Box::new(processo_ingest::rasterizer(config)),
            summarizer: Arc::new(OpenAiClient::new(config.openai.clone())),
            artifacts: ArtifactStore::new()?,
        })
    }
}
