use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::traits::{Completer, CompletionRequest, LLMError};

/// In-memory completer used in tests.
///
/// Responses are handed out in order; the last one keeps repeating once the
/// queue runs dry. Every request is recorded for later inspection.
#[derive(Default)]
pub struct MockCompleter {
    responses: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompleter {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            ..Default::default()
        }
    }

    /// A completer whose every call fails with a network error.
    pub fn failing(message: impl Into<String>) -> Self {
        let mock = Self::default();
        mock.push_error(message);
        mock
    }

    pub fn push(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(response.into()));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.into()));
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// User prompt of the most recent request.
    pub fn last_prompt(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.prompt().map(str::to_string))
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LLMError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        let out = match next {
            Some(r) => {
                *self.last.lock().unwrap() = Some(r.clone());
                r
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no mock response queued".into())),
        };
        out.map_err(LLMError::Network)
    }
}
