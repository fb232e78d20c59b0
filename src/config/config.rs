use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Предел по умолчанию для одного блока с длиной: 512 МиБ.
pub const DEFAULT_MAX_BLOB_LEN: u64 = 512 * 1024 * 1024;
/// Размер внутреннего буфера чтения по умолчанию.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Что делать с CRC-64 в конце дампа.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Несовпадение — ошибка `CorruptData`
    #[default]
    Verify,
    /// Сумма читается и игнорируется
    Skip,
    /// Несовпадение пишется в лог на уровне `warn`
    Warn,
}

/// Настройки декодера.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DecoderConfig {
    pub checksum: ChecksumPolicy,
    /// Верхняя граница любой заявленной длины, байт
    pub max_blob_len: u64,
    /// Размер буфера `BufReader`
    pub buffer_capacity: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            checksum: ChecksumPolicy::Verify,
            max_blob_len: DEFAULT_MAX_BLOB_LEN,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl DecoderConfig {
    pub fn with_checksum(
        mut self,
        policy: ChecksumPolicy,
    ) -> Self {
        self.checksum = policy;
        self
    }

    pub fn with_max_blob_len(
        mut self,
        limit: u64,
    ) -> Self {
        self.max_blob_len = limit;
        self
    }
}

impl FromStr for ChecksumPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "verify" => Ok(ChecksumPolicy::Verify),
            "skip" => Ok(ChecksumPolicy::Skip),
            "warn" => Ok(ChecksumPolicy::Warn),
            other => Err(format!(
                "unknown checksum policy '{other}', expected verify, skip or warn"
            )),
        }
    }
}

impl fmt::Display for ChecksumPolicy {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            ChecksumPolicy::Verify => "verify",
            ChecksumPolicy::Skip => "skip",
            ChecksumPolicy::Warn => "warn",
        };
        f.write_str(s)
    }
}
