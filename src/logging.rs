//! Tracing subscriber setup for the `spnmux` binary.

use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// Installs the global fmt subscriber.
///
/// `default_filter` applies when `RUST_LOG` is unset. Log lines go to stderr
/// so batch reports on stdout stay machine-readable.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_cleanly() {
        let _ = init_tracing("info");

        let err = init_tracing("debug").unwrap_err();
        assert!(err.to_string().contains("failed to initialize tracing"));
    }
}
