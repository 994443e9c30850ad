use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log directives used when RUST_LOG is unset.
pub const DEFAULT_LOG_SETTINGS: &str = "api_blog=debug,data_model_blog=debug,tower_http=debug";

/// Installs the global tracing subscriber.
/// RUST_LOG takes precedence over `default_log_settings` when present and valid.
pub fn setup_logging(default_log_settings: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_settings.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init()
}
