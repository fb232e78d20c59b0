use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// Фильтр из `RUST_LOG`, а если его нет — из конфигурации.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    let directive = config.build_filter_directive();

    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => match EnvFilter::try_new(&directive) {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!("Invalid log filter directive '{directive}': {e}; falling back to 'warn'");
                EnvFilter::new("warn")
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::*;

    /// Тест проверяет, что без `RUST_LOG` используется директива из конфига.
    #[test]
    #[serial]
    fn test_filter_from_config() {
        env::remove_var("RUST_LOG");
        let cfg = LoggingConfig {
            level: "debug".into(),
            ..Default::default()
        };
        let filter = build_filter_from_config(&cfg);
        assert!(filter.to_string().contains("rdbstream=debug"));
    }

    /// Тест проверяет приоритет `RUST_LOG`.
    #[test]
    #[serial]
    fn test_rust_log_overrides() {
        env::set_var("RUST_LOG", "rdbstream=trace");
        let filter = build_filter_from_config(&LoggingConfig::default());
        env::remove_var("RUST_LOG");
        assert!(filter.to_string().contains("rdbstream=trace"));
    }
}
