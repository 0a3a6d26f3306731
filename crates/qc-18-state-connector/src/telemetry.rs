//! Logging setup for processes embedding the State Connector.

use tracing_subscriber::EnvFilter;

/// Log filter used when neither `QC_LOG_LEVEL` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a global `tracing` subscriber.
///
/// Filter comes from `QC_LOG_LEVEL`, then `RUST_LOG`, then
/// [`DEFAULT_LOG_FILTER`]. Returns `false` if a subscriber was already set.
pub fn init_tracing(json_logs: bool) -> bool {
    let filter = std::env::var("QC_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true);

    let installed = if json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        init_tracing(false);
        assert!(!init_tracing(false));
    }
}
