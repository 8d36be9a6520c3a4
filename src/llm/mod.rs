//! Vision LLM provider abstraction.
//!
//! Trait-based so the pipeline can run against the real providers in the app
//! and a deterministic fake in tests. Each provider owns its wire format and
//! its response-shape extraction.

mod fake;
mod gemini;
mod openai;

pub use fake::FakeProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// A completion request: textual prompt plus the product photos as data URLs.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest<'a> {
    pub system: Option<&'a str>,
    pub prompt: &'a str,
    /// `data:image/jpeg;base64,...` payloads.
    pub images: &'a [String],
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Trait for vision-capable LLM providers.
///
/// Implementations are stateless and thread-safe; retry and timeout policy
/// belongs to the caller, not to the provider.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a completion request and return the model's raw text response.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError>;

    /// Provider name (e.g. "openai", "gemini", "fake").
    fn provider_name(&self) -> &'static str;

    /// Model name (e.g. "gpt-4o-mini").
    fn model_name(&self) -> &str;
}

/// Build a provider from environment variables.
///
/// - `LISTING_PROVIDER`: "openai" | "gemini" | "fake" (default "openai")
/// - `OPENAI_API_KEY` / `OPENAI_VISION_MODEL`
/// - `GEMINI_API_KEY` / `GEMINI_MODEL`
pub fn provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let provider = std::env::var("LISTING_PROVIDER").unwrap_or_else(|_| "openai".to_string());

    match provider.as_str() {
        "fake" => Ok(Box::new(FakeProvider::default())),
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| LlmError::NotConfigured("OPENAI_API_KEY not set".to_string()))?;
            let model = std::env::var("OPENAI_VISION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string());
            Ok(Box::new(OpenAiProvider::new(api_key, model)))
        }
        "gemini" => {
            let api_key = std::env::var("GEMINI_API_KEY")
                .map_err(|_| LlmError::NotConfigured("GEMINI_API_KEY not set".to_string()))?;
            let model =
                std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
            Ok(Box::new(GeminiProvider::new(api_key, model)))
        }
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}

/// Split a `data:` URL into its mime type and base64 payload.
pub(crate) fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (mime, data) = rest.split_once(";base64,")?;
    if mime.is_empty() || data.is_empty() {
        return None;
    }
    Some((mime, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_data_url() {
        let (mime, data) = split_data_url("data:image/jpeg;base64,QUJD").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(data, "QUJD");

        assert!(split_data_url("https://example.com/a.jpg").is_none());
        assert!(split_data_url("data:image/jpeg;base64,").is_none());
    }
}
