//! Console logging for applications embedding the registry.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the binary. [`init_tracing`] is a ready-made one.

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_LEVEL_ENV: &str = "DATASOURCE_LOG_LEVEL";

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Filter directive: `RUST_LOG`, then `DATASOURCE_LOG_LEVEL`, then `info`.
fn log_filter() -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_LEVEL_ENV))
        .unwrap_or_else(|_| "info".to_string())
}

/// Installs a console subscriber once per process.
///
/// Safe to call repeatedly and from tests; if another global subscriber is
/// already installed it is kept.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let filter = log_filter();
        let use_ansi = IsTerminal::is_terminal(&std::io::stdout());

        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(use_ansi)
            .with_filter(EnvFilter::new(&filter));

        if tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized");
        } else {
            tracing::debug!(filter = %filter, ansi_colors = use_ansi, "Console logging initialized");
        }
    });
}
