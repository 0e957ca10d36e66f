//! HTTP service exposing the story generation pipeline and saved stories.

pub mod config;
pub mod logging;
pub mod web;

use std::sync::Arc;

use storycraft::{FileStore, MemoryStore, Pipeline, StoryStore};
use tracing::info;

pub use config::Config;
pub use logging::init_logging;
pub use web::{ApiError, AppState, app};

/// Build the shared state (completer, pipeline, store) described by `config`.
///
/// # Errors
///
/// Fails when the completion backend cannot be configured, for example when
/// the OpenAI backend is selected without an API key.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let completer = llm::build_completer(&config.backend_settings())?;
    let store: Arc<dyn StoryStore> = match &config.data_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "storing stories on disk");
            Arc::new(FileStore::new(dir))
        }
        None => {
            info!("storing stories in memory");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(AppState {
        pipeline: Arc::new(Pipeline::new(completer, config.pipeline_settings())),
        store,
    })
}
