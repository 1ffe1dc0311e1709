//! OpenAI recommendation generator.
//!
//! Sends one chat completion per domain and returns the assistant text.
//! Failures map onto [`RecommendationError`]; callers fall back to the
//! built-in template.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let recommender = OpenAIRecommender::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

use crate::ports::{RecommendationError, RecommendationGenerator, RecommendationRequest};

const SYSTEM_PROMPT: &str = "You are a maturity assessment consultant. Given a domain score \
and the answers behind it, write two or three sentences of concrete, practical advice for \
the next step. Plain text, no headings, no lists.";

/// Configuration for the OpenAI recommender.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(20),
            max_tokens: 400,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

pub struct OpenAIRecommender {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIRecommender {
    pub fn new(config: OpenAIConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Falling back to default HTTP client");
                Client::new()
            });
        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_openai_request(&self, request: &RecommendationRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: build_prompt(request),
                },
            ],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(0.4),
        }
    }

    async fn handle_response_status(
        &self,
        response: Response,
    ) -> Result<Response, RecommendationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(RecommendationError::Unavailable(
                "authentication failed".to_string(),
            )),
            429 => Err(RecommendationError::Unavailable("rate limited".to_string())),
            _ => Err(RecommendationError::Unavailable(format!(
                "status {}: {}",
                status, body
            ))),
        }
    }
}

/// User message describing one domain result.
pub fn build_prompt(request: &RecommendationRequest) -> String {
    let mut prompt = format!(
        "Assessment: {}\nDomain: {}\nScore: {:.1}% ({})\nAnswers:\n",
        request.type_name,
        request.domain_name,
        request.score,
        request.maturity.as_str()
    );
    for (question, answer) in &request.answers {
        let _ = writeln!(prompt, "- {}: {}", question, answer.label());
    }
    prompt
}

fn extract_text(response: OpenAIResponse) -> Result<String, RecommendationError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| RecommendationError::InvalidResponse("no choices in response".to_string()))
}

#[async_trait]
impl RecommendationGenerator for OpenAIRecommender {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<String, RecommendationError> {
        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&self.to_openai_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RecommendationError::Timeout
                } else {
                    RecommendationError::Unavailable(e.to_string())
                }
            })?;
        let response = self.handle_response_status(response).await?;
        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| RecommendationError::InvalidResponse(e.to_string()))?;
        extract_text(parsed)
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}
