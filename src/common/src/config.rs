use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

pub static CONFIG: OnceCell<Configuration> = OnceCell::new();

/// Object storage backing the export artifacts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage DSN: `file:///path`, `memory://`, or `s3://host/bucket`
    pub dsn: String,
    /// Key prefix under which all export artifacts live
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dsn: String::from("memory://"),
            prefix: String::from("exports"),
        }
    }
}

/// Tuning for the export service itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Time a finished result stays reachable after its last access
    #[serde(with = "humantime_serde")]
    pub result_ttl: Duration,
    /// How often the registry sweeper scans for expired results
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
    /// Maximum number of jobs waiting behind the single worker
    pub queue_capacity: usize,
    /// Upper bound on the latest-telemetry fetch inside a job
    #[serde(with = "humantime_serde")]
    pub latest_telemetry_timeout: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            result_ttl: Duration::from_secs(24 * 60 * 60),
            sweep_interval: Duration::from_secs(60),
            queue_capacity: 16,
            latest_telemetry_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    pub storage: StorageConfig,
    pub export: ExportConfig,
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file("charon.toml"))
            .merge(Env::prefixed("CHARON__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration() {
        let config = Configuration::default();

        assert_eq!(config.storage.dsn, "memory://");
        assert_eq!(config.storage.prefix, "exports");
        assert_eq!(config.export.result_ttl, Duration::from_secs(86400));
        assert_eq!(config.export.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.export.queue_capacity, 16);
        assert_eq!(
            config.export.latest_telemetry_timeout,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn env_var_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CHARON__STORAGE__DSN", "file:///tmp/exports");
            jail.set_env("CHARON__EXPORT__QUEUE_CAPACITY", "4");
            jail.set_env("CHARON__EXPORT__RESULT_TTL", "1h");

            let config: Configuration =
                Figment::from(Serialized::defaults(Configuration::default()))
                    .merge(Env::prefixed("CHARON__").split("__"))
                    .extract()?;

            assert_eq!(config.storage.dsn, "file:///tmp/exports");
            assert_eq!(config.export.queue_capacity, 4);
            assert_eq!(config.export.result_ttl, Duration::from_secs(3600));
            Ok(())
        });
    }

    #[test]
    fn toml_file_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "charon.toml",
                r#"
                    [storage]
                    dsn = "memory://"
                    prefix = "test-exports"

                    [export]
                    sweep_interval = "5s"
                "#,
            )?;

            let config: Configuration =
                Figment::from(Serialized::defaults(Configuration::default()))
                    .merge(Toml::file("charon.toml"))
                    .extract()?;

            assert_eq!(config.storage.prefix, "test-exports");
            assert_eq!(config.export.sweep_interval, Duration::from_secs(5));
            // Untouched sections keep their defaults
            assert_eq!(config.export.queue_capacity, 16);
            Ok(())
        });
    }
}
