pub mod config;

use std::convert::Infallible;
use std::future;
use std::sync::Arc;

use anyhow::Result;
use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::StreamExt;
use routewise_agents::{OpenAiClient, QueryInterpreter, ResponseSummarizer};
use routewise_core::{
    CompletionError, InterpretRequest, InterpretationResult, SummarizeRequest,
};
use routewise_observability::{AppMetrics, MetricsSnapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use crate::config::AppConfig;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";
pub const PROTOCOL_ERROR_MESSAGE: &str = "Incorrect LLM response";
const EVENT_STREAM: &str = "text/event-stream";

#[derive(Clone)]
pub struct ApiState {
    pub interpreter: Arc<QueryInterpreter<OpenAiClient>>,
    pub summarizer: Arc<ResponseSummarizer<OpenAiClient>>,
    pub metrics: Arc<AppMetrics>,
    pub model: String,
    pub allowed_origins: Arc<Vec<String>>,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let metrics = AppMetrics::shared();
        let backend = build_backend(config)?;

        Ok(Self {
            interpreter: Arc::new(QueryInterpreter::new(backend.clone(), metrics.clone())),
            summarizer: Arc::new(ResponseSummarizer::new(backend, metrics.clone())),
            metrics,
            model: config.openai_model.clone(),
            allowed_origins: Arc::new(config.allowed_origins.clone()),
        })
    }
}

/// The single upstream client, built once and shared read-only by both handlers.
pub fn build_backend(config: &AppConfig) -> Result<Arc<OpenAiClient>> {
    Ok(Arc::new(OpenAiClient::new(
        config.http_client()?,
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    )))
}

pub fn build_app(config: &AppConfig) -> Result<Router> {
    Ok(build_router(ApiState::new(config)?))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/interpret", post(interpret))
        .route("/summarize", post(summarize))
        .route("/api/textToLocationRequest", post(interpret))
        .route("/api/locationResponseToText", post(summarize))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Every failure reaches the client as a flat 500; the cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// The model replied without selecting one of the offered functions.
    Protocol,
    Internal,
}

impl ApiError {
    pub fn message(self) -> &'static str {
        match self {
            Self::Protocol => PROTOCOL_ERROR_MESSAGE,
            Self::Internal => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl From<CompletionError> for ApiError {
    fn from(error: CompletionError) -> Self {
        if error.is_protocol_violation() {
            Self::Protocol
        } else {
            Self::Internal
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        warn!(status = %rejection.status(), error = %rejection.body_text(), "request body could not be read");
        Self::Internal
    }
}

/// Bodies are decoded as JSON whatever their `content-type` says.
fn decode_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError> {
    serde_json::from_slice(&body?).map_err(|error| {
        warn!(error = %error, "rejected request body");
        ApiError::Internal
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message(),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    model: String,
    metrics: MetricsSnapshot,
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        model: state.model.clone(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn interpret(
    State(state): State<ApiState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<InterpretationResult>, ApiError> {
    let request: InterpretRequest = decode_body(body)?;
    let result = state.interpreter.interpret(&request.text_query).await?;
    Ok(Json(result))
}

async fn summarize(
    State(state): State<ApiState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let request: SummarizeRequest = decode_body(body)?;
    let fragments = state
        .summarizer
        .summarize(&request.user_input, &request.location_response)
        .await?;

    // Raw fragments, no `data:` framing. A mid-stream failure ends the body
    // after whatever was already flushed.
    let body = fragments
        .take_while(|item| {
            if let Err(error) = item {
                warn!(error = %error, "summary stream ended early");
            }
            future::ready(item.is_ok())
        })
        .filter_map(|item| future::ready(item.ok()))
        .map(Ok::<_, Infallible>);

    Ok((
        [(header::CONTENT_TYPE, EVENT_STREAM)],
        Body::from_stream(body),
    )
        .into_response())
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
