use reqwest::Client;
use routewise_core::CompletionError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{AssistantMessage, ChatRequest, CompletionBackend, FragmentStream};
use crate::sse::content_fragments;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4-0613";

/// Chat-completions client for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionPayload<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
    #[serde(flatten)]
    request: &'a ChatRequest,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: AssistantMessage,
}

impl OpenAiClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<reqwest::Response, CompletionError> {
        let payload = CompletionPayload {
            model: &self.model,
            stream,
            request,
        };

        debug!(model = %self.model, stream, "sending completion request");
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| CompletionError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

impl CompletionBackend for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<AssistantMessage, CompletionError> {
        let response: CompletionResponse = self
            .send(request, false)
            .await?
            .json()
            .await
            .map_err(|error| CompletionError::Decode(error.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(CompletionError::MissingChoice)
    }

    async fn stream(&self, request: &ChatRequest) -> Result<FragmentStream, CompletionError> {
        let response = self.send(request, true).await?;
        Ok(content_fragments(response.bytes_stream()))
    }
}
