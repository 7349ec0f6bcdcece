use std::sync::Arc;

use futures::StreamExt;
use routewise_core::{summarizer_user_prompt, CompletionError, SUMMARIZER_SYSTEM_PROMPT};
use routewise_observability::AppMetrics;
use tracing::{info, instrument, warn};

use crate::backend::{ChatMessage, ChatRequest, CompletionBackend, FragmentStream};

/// Streams an HTML description of a mapping API response.
pub struct ResponseSummarizer<B> {
    backend: Arc<B>,
    metrics: Arc<AppMetrics>,
}

impl<B> ResponseSummarizer<B>
where
    B: CompletionBackend,
{
    pub fn new(backend: Arc<B>, metrics: Arc<AppMetrics>) -> Self {
        Self { backend, metrics }
    }

    pub fn build_request(user_input: &str, location_response: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage::system(SUMMARIZER_SYSTEM_PROMPT),
                ChatMessage::user(summarizer_user_prompt(user_input, location_response)),
            ],
            ..ChatRequest::default()
        }
    }

    /// Opens the upstream stream. The returned fragments are the upstream's, in
    /// arrival order; concatenated they form the HTML body content.
    #[instrument(skip_all, fields(payload_bytes = location_response.len()))]
    pub async fn summarize(
        &self,
        user_input: &str,
        location_response: &str,
    ) -> Result<FragmentStream, CompletionError> {
        self.metrics.inc_summary();
        let request = Self::build_request(user_input, location_response);

        match self.backend.stream(&request).await {
            Ok(fragments) => {
                info!("summary stream opened");
                let metrics = self.metrics.clone();
                Ok(fragments
                    .inspect(move |item| match item {
                        Ok(_) => metrics.inc_fragment(),
                        Err(_) => metrics.inc_upstream_failure(),
                    })
                    .boxed())
            }
            Err(error) => {
                self.metrics.inc_upstream_failure();
                warn!(error = %error, "summary stream could not be opened");
                Err(error)
            }
        }
    }
}
