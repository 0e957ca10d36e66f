//! Abstractions for calling large language model completion services.
//!
//! The `llm` crate defines a [`Completer`] trait along with concrete
//! implementations for OpenAI-style endpoints ([`OpenAIClient`]) and Ollama
//! ([`OllamaClient`]), plus a [`MockCompleter`] for tests.

pub mod backend;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod traits;

pub use backend::{Backend, BackendSettings, build_completer};
pub use mock::MockCompleter;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;
pub use traits::{ChatMessage, Completer, CompletionRequest, LLMError, Role};
