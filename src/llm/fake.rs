//! Fake LLM provider for tests.
//!
//! Returns canned responses keyed by prompt-substring matching, so the whole
//! pipeline runs without network access. Queued responses take priority,
//! letting a test script multi-call exchanges (extraction then SKU recovery).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionRequest, LlmError, LlmProvider};

/// A fake vision provider for tests.
#[derive(Debug, Default)]
pub struct FakeProvider {
    /// (prompt substring, response) pairs, first match wins.
    responses: Vec<(String, String)>,
    /// Responses served in order before substring matching applies.
    queued: Mutex<VecDeque<String>>,
    /// Response when nothing matches.
    default_response: Option<String>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` to any prompt containing `prompt_contains`.
    pub fn with_response(mut self, prompt_contains: &str, response: &str) -> Self {
        self.responses
            .push((prompt_contains.to_string(), response.to_string()));
        self
    }

    /// Serve `response` to the next call, whatever the prompt.
    pub fn with_queued_response(self, response: &str) -> Self {
        self.queued.lock().unwrap().push_back(response.to_string());
        self
    }

    /// Respond with `response` when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        if let Some(queued) = self.queued.lock().unwrap().pop_front() {
            return Ok(queued);
        }

        let prompt_lower = request.prompt.to_lowercase();
        for (pattern, response) in &self.responses {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: no response configured for prompt: {}",
                request.prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest<'_> {
        CompletionRequest {
            prompt,
            ..CompletionRequest::default()
        }
    }

    #[tokio::test]
    async fn test_substring_matching_is_case_insensitive() {
        let provider = FakeProvider::new().with_response("HELLO", "world");
        let result = provider.complete(request("say hello")).await.unwrap();
        assert_eq!(result, "world");
    }

    #[tokio::test]
    async fn test_queued_responses_serve_in_order() {
        let provider = FakeProvider::new()
            .with_queued_response("first")
            .with_queued_response("second")
            .with_default_response("fallback");
        assert_eq!(provider.complete(request("x")).await.unwrap(), "first");
        assert_eq!(provider.complete(request("x")).await.unwrap(), "second");
        assert_eq!(provider.complete(request("x")).await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_no_match_without_default_is_an_error() {
        let provider = FakeProvider::new();
        assert!(provider.complete(request("anything")).await.is_err());
    }
}
