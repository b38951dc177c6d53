//! Graceful shutdown signal.

/// Resolves on Ctrl+C
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, stopping server"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
