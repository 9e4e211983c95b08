//! Logging setup.
//!
//! Output goes to stderr so the STDIO transport keeps stdout for protocol
//! messages. `RUST_LOG` directives are layered on top of the configured level.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use super::config::LoggingConfig;

/// Map a configured level name to a tracing level. Unknown names mean INFO.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::from_default_env().add_directive(parse_level(&config.level).into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }
}
