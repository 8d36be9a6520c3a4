//! Gemini `generateContent` provider with vision input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{split_data_url, CompletionRequest, LlmError, LlmProvider};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Provider speaking the Gemini wire format.
#[derive(Debug)]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
enum Part<'a> {
    #[serde(rename = "text")]
    Text(&'a str),
    #[serde(rename = "inline_data")]
    InlineData { mime_type: &'a str, data: &'a str },
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    // The REST API answers in lowerCamelCase.
    #[serde(default, rename = "finishReason", alias = "finish_reason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let mut parts: Vec<Part<'_>> = Vec::new();
        for url in request.images {
            match split_data_url(url) {
                Some((mime_type, data)) => parts.push(Part::InlineData { mime_type, data }),
                None => tracing::warn!("image ignorée (format non supporté par Gemini)"),
            }
        }
        parts.push(Part::Text(request.prompt));

        let body = GenerateRequest {
            system_instruction: request.system.map(|text| Content {
                role: None,
                parts: vec![Part::Text(text)],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: "application/json",
            },
        };

        tracing::debug!(model = %self.model, images = request.images.len(), "appel Gemini");

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            BASE_URL, self.model, self.api_key
        );
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if status != 200 {
            return Err(LlmError::ApiError {
                status,
                message: body,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;

        let mut texts: Vec<String> = Vec::new();
        let mut finish_reasons: Vec<String> = Vec::new();
        for candidate in parsed.candidates {
            if let Some(reason) = candidate.finish_reason {
                finish_reasons.push(reason);
            }
            if let Some(content) = candidate.content {
                for part in content.parts {
                    if let Some(text) = part.text {
                        if !text.is_empty() {
                            texts.push(text);
                        }
                    }
                }
            }
        }

        if texts.is_empty() {
            let mut message = "Réponse Gemini sans contenu textuel exploitable".to_string();
            if !finish_reasons.is_empty() {
                message.push_str(&format!(" (codes de fin : {})", finish_reasons.join(", ")));
            }
            return Err(LlmError::ParseError(message));
        }
        Ok(texts.concat().trim().to_string())
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
