use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Credential, GenerationRequest, TextGenerator};
use crate::config::{Credentials, GenerationConfig};
use crate::{CondenserError, Result};

// OpenAI-compatible completions request/response
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for an OpenAI-compatible `/completions` endpoint
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_output_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: u64,
    credentials: Credentials,
}

impl OpenAiClient {
    pub fn new(config: &GenerationConfig, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
            credentials,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/completions", self.base_url)
    }

    fn api_key(&self, credential: Credential) -> Result<&str> {
        match credential {
            Credential::Writer => Ok(self.credentials.writer.as_str()),
            Credential::Reviewer => self.credentials.reviewer.as_deref().ok_or_else(|| {
                CondenserError::Generation("no reviewer API key configured".to_string()).into()
            }),
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let api_key = self.api_key(request.credential)?;

        tracing::debug!(
            "Sending {} chars to {} as {}",
            request.prompt.len(),
            self.model,
            request.credential
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&self.request_body(&request.prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CondenserError::Generation(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    CondenserError::Generation(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            CondenserError::Generation(format!("failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(CondenserError::Generation(format!(
                "HTTP {}: {}",
                status,
                api_error_message(&body)
            ))
            .into());
        }

        parse_completion(&body)
    }
}

/// Pull the generated text out of a completions response body
fn parse_completion(body: &str) -> Result<String> {
    let response: CompletionResponse = serde_json::from_str(body).map_err(|e| {
        CondenserError::Generation(format!("malformed completion response: {}", e))
    })?;

    let choice = response.choices.into_iter().next().ok_or_else(|| {
        CondenserError::Generation("completion response has no choices".to_string())
    })?;

    Ok(choice.text.trim().to_string())
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| crate::utils::preview(body.trim(), 200))
}
