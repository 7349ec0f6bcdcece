use anyhow::{Context, Result};
use routewise_api::{build_app, AppConfig};
use routewise_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("routewise_api");

    let config = AppConfig::from_env().context("invalid startup configuration")?;
    let app = build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(
        bind = %config.bind,
        model = %config.openai_model,
        upstream = %config.openai_base_url,
        "routewise api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
