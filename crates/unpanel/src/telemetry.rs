//! Subscriber setup for hosts that don't install their own.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unpanel_core::{LogConfig, UnpanelError, UnpanelResult};

/// Install a global subscriber from `[log]`. `RUST_LOG` wins over `log.level`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> UnpanelResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
    };
    result.map_err(|e| UnpanelError::Config(format!("installing tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_reported() {
        let config = LogConfig {
            level: "unpanel=debug".into(),
            format: "json".into(),
        };
        let _ = init_tracing(&config);
        let err = init_tracing(&config).unwrap_err();
        assert!(matches!(err, UnpanelError::Config(_)));
    }
}
