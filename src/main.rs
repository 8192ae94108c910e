/// CLI: шаги конвейера и веб-сервис

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use loyers_ml::{pipeline, serving, Config};

const USAGE: &str = "usage: loyers-ml <obtain|scrub|train|serve|pipeline>";

#[tokio::main]
async fn main() -> Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let command = std::env::args().nth(1).unwrap_or_default();
    let config = Config::load().context("Failed to load configuration")?;

    match command.as_str() {
        "obtain" => obtain(&config).await,
        "scrub" => scrub(&config),
        "train" => train(&config),
        "serve" => serve(&config).await,
        "pipeline" => {
            obtain(&config).await?;
            scrub(&config)?;
            train(&config)
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

async fn obtain(config: &Config) -> Result<()> {
    pipeline::obtain(config).await.context("Data acquisition failed")?;
    Ok(())
}

fn scrub(config: &Config) -> Result<()> {
    pipeline::scrub(config).context("Cleaning failed")?;
    Ok(())
}

fn train(config: &Config) -> Result<()> {
    let outcome = pipeline::train(config).context("Training failed")?;
    for record in outcome.records() {
        tracing::info!(
            "{:<20} MAE={:.4} RMSE={:.4} R2={:.4}",
            record.model,
            record.mae,
            record.rmse,
            record.r2
        );
    }
    Ok(())
}

async fn serve(config: &Config) -> Result<()> {
    let state = pipeline::serving_state(config).context("Failed to prepare prediction service")?;
    let app = serving::router(state, Duration::from_secs(config.server.request_timeout_seconds));

    let addr = config.server.socket_addr().context("Invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
