//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use jp_shared::config::{LogFormat, LoggingConfig};

/// Install the global subscriber described by `config`
///
/// `RUST_LOG` wins over the configured level when it is set. Calling this
/// twice is harmless; the second call leaves the first subscriber in place.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let result = match config.format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Pretty => builder.pretty().with_ansi(config.colored).try_init(),
        LogFormat::Compact => builder.compact().with_ansi(config.colored).try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("Tracing subscriber already installed: {}", e);
    }
}
