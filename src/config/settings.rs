use serde::{Deserialize, Serialize};

use config::{Config, ConfigError, Environment};

use super::{ChecksumPolicy, DecoderConfig, DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_BLOB_LEN};
use crate::logging::{LogFormat, LoggingConfig};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ConfigError),
    #[error("max_blob_len must be greater than zero")]
    ZeroBlobLimit,
    #[error("buffer_capacity must be greater than zero")]
    ZeroBuffer,
}

/// Настройки из окружения (`RDBSTREAM_*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub checksum: ChecksumPolicy,
    pub max_blob_len: u64,
    pub buffer_capacity: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        let cfg = Config::builder()
            // Добавляем значения по умолчанию
            .set_default("checksum", "verify")?
            .set_default("max_blob_len", DEFAULT_MAX_BLOB_LEN)?
            .set_default("buffer_capacity", DEFAULT_BUFFER_CAPACITY as u64)?
            .set_default("log_level", "warn")?
            .set_default("log_format", "compact")?
            // Добавляем переменные окружения с префиксом RDBSTREAM_
            .add_source(Environment::with_prefix("RDBSTREAM").try_parsing(true))
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.max_blob_len == 0 {
            return Err(SettingsError::ZeroBlobLimit);
        }
        if self.buffer_capacity == 0 {
            return Err(SettingsError::ZeroBuffer);
        }
        Ok(())
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            checksum: self.checksum,
            max_blob_len: self.max_blob_len,
            buffer_capacity: self.buffer_capacity,
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format,
            ..LoggingConfig::default()
        }
    }
}
