use config::ObservabilityConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.logging_level`. Returns `false`
/// when a subscriber was already installed, which leaves the existing one in
/// place.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging_level.as_str()));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        let config = ObservabilityConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
