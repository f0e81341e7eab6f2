use anyhow::{Context, Result};

use daily_shuffle::config::Config;
use daily_shuffle::http::ShuffleServer;
use daily_shuffle::metrics;
use daily_shuffle::storage::create_store;

/// Start the HTTP server and, unless disabled, the daily trigger
pub async fn serve(config: Config) -> Result<()> {
    config.validate()?;

    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed, continuing without metrics");
    }

    let store = create_store(&config.store).context("Failed to open shuffle store")?;
    let server = ShuffleServer::new(config, store).context("Failed to create shuffle server")?;

    println!("{}", server.info().display());
    println!();
    println!("API Endpoints:");
    println!("  GET  /              - Latest daily shuffle");
    println!("  GET  /api/shuffle   - Latest daily shuffle");
    println!("  GET  /api/health    - Health check");
    println!("  GET  /metrics       - Prometheus metrics endpoint");
    println!();

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
