use futures::stream::BoxStream;
use routewise_core::{CompletionError, FunctionCall};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lazily produced, ordered text fragments of a streamed completion.
pub type FragmentStream = BoxStream<'static, Result<String, CompletionError>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
}

pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<AssistantMessage, CompletionError>;

    /// Errors returned here happen before any fragment is produced.
    async fn stream(&self, request: &ChatRequest) -> Result<FragmentStream, CompletionError>;
}
