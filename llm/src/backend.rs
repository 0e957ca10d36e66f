//! Selecting and building a completion backend from configuration.

use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use crate::{Completer, LLMError, OllamaClient, OpenAIClient};

/// Which completion service to talk to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    OpenAI,
    Ollama,
}

impl FromStr for Backend {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            other => Err(LLMError::Config(format!("unknown backend `{other}`"))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => f.write_str("openai"),
            Self::Ollama => f.write_str("ollama"),
        }
    }
}

/// Connection settings for [`build_completer`].
#[derive(Clone, Debug)]
pub struct BackendSettings {
    pub backend: Backend,
    pub openai_url: String,
    pub openai_api_key: Option<String>,
    pub ollama_url: String,
    pub timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            backend: Backend::OpenAI,
            openai_url: crate::openai::DEFAULT_OPENAI_URL.into(),
            openai_api_key: None,
            ollama_url: crate::ollama::DEFAULT_OLLAMA_URL.into(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Build the completer described by `settings`.
pub fn build_completer(settings: &BackendSettings) -> Result<Arc<dyn Completer>, LLMError> {
    match settings.backend {
        Backend::OpenAI => {
            let key = settings.openai_api_key.clone().unwrap_or_default();
            Ok(Arc::new(OpenAIClient::new(
                &settings.openai_url,
                key,
                settings.timeout,
            )?))
        }
        Backend::Ollama => Ok(Arc::new(
            OllamaClient::new(&settings.ollama_url)?.with_timeout(settings.timeout),
        )),
    }
}
