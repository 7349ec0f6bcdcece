use std::sync::Arc;
use std::time::Instant;

use routewise_core::{
    function_definitions, CompletionError, InterpretationResult, INTERPRETER_SYSTEM_PROMPT,
};
use routewise_observability::AppMetrics;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::backend::{ChatMessage, ChatRequest, CompletionBackend};

/// Turns a free-text query into one of the structured map actions.
///
/// Which action applies, its parameters, and whether the query is supported at
/// all are decided by the completion model; this type only offers the function
/// menu and checks the selection against the chosen schema.
pub struct QueryInterpreter<B> {
    backend: Arc<B>,
    metrics: Arc<AppMetrics>,
}

impl<B> QueryInterpreter<B>
where
    B: CompletionBackend,
{
    pub fn new(backend: Arc<B>, metrics: Arc<AppMetrics>) -> Self {
        Self { backend, metrics }
    }

    pub fn build_request(text_query: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system(INTERPRETER_SYSTEM_PROMPT),
                ChatMessage::user(text_query),
            ],
            functions: Some(function_definitions()),
            function_call: Some(json!("auto")),
        }
    }

    #[instrument(skip(self, text_query), fields(query_chars = text_query.chars().count()))]
    pub async fn interpret(&self, text_query: &str) -> Result<InterpretationResult, CompletionError> {
        let started = Instant::now();
        self.metrics.inc_interpretation();

        let outcome = self.select_function(text_query).await;
        self.metrics.observe_latency(started.elapsed());

        match &outcome {
            Ok(result) => {
                if result.is_invalid() {
                    self.metrics.inc_invalid_query();
                }
                info!(function = result.function_name().as_str(), "query interpreted");
            }
            Err(error) if error.is_protocol_violation() => {
                self.metrics.inc_protocol_error();
                warn!(error = %error, "model answered without selecting a function");
            }
            Err(error) => {
                self.metrics.inc_upstream_failure();
                warn!(error = %error, "query interpretation failed");
            }
        }

        outcome
    }

    async fn select_function(
        &self,
        text_query: &str,
    ) -> Result<InterpretationResult, CompletionError> {
        let request = Self::build_request(text_query);
        let message = self.backend.complete(&request).await?;
        let call = message
            .function_call
            .ok_or(CompletionError::MissingFunctionCall)?;

        Ok(InterpretationResult::from_function_call(&call)?)
    }
}
