//! Logging setup utilities for Barcart binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The default filter covers the calling binary (whose library crate shares
/// its name), `barcart_shared` and the HTTP request traces from `tower_http`.
/// It can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "barcart-server", "barcart-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use barcart_shared::logger::setup_logger;
///
/// setup_logger("barcart-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let crate_name = binary_name.replace('-', "_");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{crate_name}={level},barcart_shared={level},tower_http={level}",
                    level = default_log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
