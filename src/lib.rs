pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod session;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` overrides the built-in default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
