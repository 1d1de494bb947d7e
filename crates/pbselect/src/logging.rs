use std::env;
use std::str::FromStr;

use tracing::Subscriber;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

const LOG_LEVEL_VAR_NAME: &str = "PBSELECT_LOG_LEVEL";

/// Level from `PBSELECT_LOG_LEVEL`, or `WARN`. `verbose` forces `DEBUG`.
pub fn log_level(verbose: bool) -> tracing::Level {
    if verbose {
        return tracing::Level::DEBUG;
    }
    env::var(LOG_LEVEL_VAR_NAME)
        .ok()
        .and_then(|v| tracing::Level::from_str(&v).ok())
        .unwrap_or(tracing::Level::WARN)
}

/// Compact stderr subscriber limited to this workspace's targets.
pub fn default_tracing(level: tracing::Level) -> impl Subscriber {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .with(default_filter_target())
}

pub fn default_filter_target<S: Subscriber>() -> impl Layer<S> {
    filter_fn(|metadata| metadata.target().starts_with("pbselect"))
}

/// Install the subscriber; a second call is a no-op.
pub fn init(verbose: bool) {
    let _ = tracing::subscriber::set_global_default(default_tracing(log_level(verbose)));
}
