use crate::config::AppConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. Fails if one is already installed.
pub fn init(config: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        let config = AppConfig {
            log_level: "not a [valid directive".to_string(),
            ..AppConfig::default()
        };
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
