//! Completion backend for an Ollama server.
//!
//! This module provides the [`OllamaClient`] type which implements the
//! [`Completer`] trait on top of Ollama's chat endpoint.

use std::time::Duration;

use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage as OllamaMessage, request::ChatMessageRequest},
    models::ModelOptions,
};
use tracing::debug;

use crate::traits::{ChatMessage, Completer, CompletionRequest, LLMError, Role};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

pub struct OllamaClient {
    inner: Ollama,
    timeout: Option<Duration>,
}

impl OllamaClient {
    /// Connect to the Ollama server at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, LLMError> {
        let inner = Ollama::try_new(base_url.as_ref())
            .map_err(|e| LLMError::Config(format!("invalid Ollama url: {e}")))?;
        Ok(Self {
            inner,
            timeout: None,
        })
    }

    /// Fail chat calls that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn to_ollama(message: &ChatMessage) -> OllamaMessage {
    match message.role {
        Role::System => OllamaMessage::system(message.content.clone()),
        Role::User => OllamaMessage::user(message.content.clone()),
        Role::Assistant => OllamaMessage::assistant(message.content.clone()),
    }
}

#[async_trait]
impl Completer for OllamaClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LLMError> {
        let messages = request.messages.iter().map(to_ollama).collect();
        let mut req = ChatMessageRequest::new(request.model.clone(), messages);
        if request.temperature.is_some() || request.max_tokens.is_some() {
            let mut opts = ModelOptions::default();
            if let Some(t) = request.temperature {
                opts = opts.temperature(t);
            }
            if let Some(n) = request.max_tokens {
                opts = opts.num_predict(n as i32);
            }
            req = req.options(opts);
        }
        debug!(model = %request.model, "sending ollama chat");
        let call = self.inner.send_chat_messages(req);
        let res = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                LLMError::Network(format!("ollama request timed out after {limit:?}"))
            })?,
            None => call.await,
        }
        .map_err(|e| LLMError::Network(e.to_string()))?;
        let content = res.message.content;
        if content.trim().is_empty() {
            return Err(LLMError::EmptyCompletion);
        }
        Ok(content)
    }
}
