use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use routewise_agents::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const API_KEY_VAR: &str = "ROUTEWISE_OPENAI_API_KEY";
const MODEL_VAR: &str = "ROUTEWISE_OPENAI_MODEL";
const BASE_URL_VAR: &str = "ROUTEWISE_OPENAI_BASE_URL";
const BIND_VAR: &str = "ROUTEWISE_BIND";
const ALLOWED_ORIGINS_VAR: &str = "ROUTEWISE_ALLOWED_ORIGINS";
const CONNECT_TIMEOUT_VAR: &str = "ROUTEWISE_CONNECT_TIMEOUT_SECONDS";

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 6;

#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub bind: String,
    pub allowed_origins: Vec<String>,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &"<redacted>")
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("bind", &self.bind)
            .field("allowed_origins", &self.allowed_origins)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl AppConfig {
    /// Reads the process environment once at startup. A missing API key is fatal.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let openai_api_key =
            non_empty(API_KEY_VAR).with_context(|| format!("{API_KEY_VAR} must be set"))?;
        let openai_model = non_empty(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let openai_base_url =
            non_empty(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let bind = non_empty(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let allowed_origins = parse_allowed_origins(non_empty(ALLOWED_ORIGINS_VAR).as_deref());
        let connect_timeout = Duration::from_secs(
            non_empty(CONNECT_TIMEOUT_VAR)
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECONDS),
        );

        Ok(Self {
            openai_api_key,
            openai_model,
            openai_base_url,
            bind,
            allowed_origins,
            connect_timeout,
        })
    }

    /// Connect timeout only; a total timeout would cut long summary streams.
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .context("failed to build HTTP client")
    }
}

fn parse_allowed_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.is_empty() {
        vec![DEFAULT_ALLOWED_ORIGIN.to_string()]
    } else {
        origins
    }
}
