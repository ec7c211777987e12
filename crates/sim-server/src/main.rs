mod config;
mod wiring;

use std::error::Error;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::from_env()?;
    let state = wiring::build_state(&config);
    let controller = state.controller().clone();
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(
        addr = %config.listen_addr,
        source = ?config.position_source,
        location = config.location.as_str(),
        notify_enabled = config.notify_enabled,
        "greenwave listening"
    );

    axum::serve(listener, wiring::build_app(state))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await?;

    controller.stop().await;
    info!("greenwave stopped");
    Ok(())
}
