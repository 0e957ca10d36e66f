use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;
use llm::{Backend, BackendSettings, ollama::DEFAULT_OLLAMA_URL, openai::DEFAULT_OPENAI_URL};
use storycraft::PipelineSettings;

/// Service configuration, read from flags with environment fallbacks.
///
/// Call [`dotenvy::dotenv`] before parsing so a `.env` file can supply the
/// variables.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Generate and edit stories from ranked source material")]
pub struct Config {
    /// Address to bind the HTTP server
    #[arg(long, env = "NEWSROOM_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Completion service: `openai` or `ollama`
    #[arg(long, env = "COMPLETION_BACKEND", default_value = "openai")]
    pub backend: Backend,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_URL)]
    pub openai_base_url: String,

    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Model used to write stories
    #[arg(long, env = "STORY_MODEL", default_value = "gpt-4o")]
    pub story_model: String,

    /// Model used for edits, interview splits and summaries
    #[arg(long, env = "UTILITY_MODEL", default_value = "gpt-4o-mini")]
    pub utility_model: String,

    /// Directory for saved stories; kept in memory when unset
    #[arg(long, env = "STORY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Completion request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    pub request_timeout: u64,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            backend: self.backend,
            openai_url: self.openai_base_url.clone(),
            openai_api_key: self.openai_api_key.clone(),
            ollama_url: self.ollama_url.clone(),
            timeout: Duration::from_secs(self.request_timeout),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            story_model: self.story_model.clone(),
            utility_model: self.utility_model.clone(),
        }
    }
}
