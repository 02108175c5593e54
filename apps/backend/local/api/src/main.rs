#[cfg(not(any(all(target_os = "macos", target_arch = "aarch64"), target_os = "ios")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use dotenv::dotenv;
use iris_api::{State, construct_router};
use iris_types::Context;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[tokio::main]
async fn main() -> iris_types::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Iris Classification API");

    let config = config::Config::from_env().context("Failed to read configuration")?;
    tracing::info!(
        "Loaded configuration: addr={}, artifact_dir={}",
        config.addr(),
        config.artifact_dir.display()
    );

    // A missing or corrupt artifact must stop the process before it listens.
    let state = State::load(&config.artifact_dir)
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load model artifacts"))
        .with_context(|| {
            format!(
                "Failed to load model artifacts from {}",
                config.artifact_dir.display()
            )
        })?;
    tracing::info!(
        models = ?state.registry.names().collect::<Vec<_>>(),
        "Model registry ready"
    );

    let app = construct_router(Arc::new(state));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
