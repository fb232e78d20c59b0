use std::any::Any;

use crate::{ErrorExt, StatusCode};

/// Класс ошибки формата, который видит вызывающий код.
///
/// Все три класса фатальны: формат не даёт способа ресинхронизироваться
/// после сбоя, поэтому декодер прекращает работу.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Байтов меньше, чем требует поле длины.
    TruncatedInput,
    /// Данные противоречат собственной структуре.
    CorruptData,
    /// Тег, опкод или специальная кодировка вне закрытой таблицы.
    UnsupportedEncoding,
}

/// Место, где встретился неизвестный байт.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSite {
    /// Тег типа значения или управляющий опкод.
    RecordTag,
    /// Специальная кодировка строки (`11xxxxxx`).
    StringEncoding,
    /// Байт кодировки элемента ziplist.
    ZiplistEntry,
    /// Байт кодировки элемента listpack.
    ListpackEntry,
    /// Тип контейнера узла quicklist.
    QuicklistContainer,
}

/// Ошибка декодирования дампа с контекстом для диагностики.
#[derive(Debug, Clone)]
pub enum RdbError {
    /// Поток закончился раньше, чем позволяет формат
    TruncatedInput {
        context: String,
        offset: Option<u64>,
        key: Option<String>,
        expected_bytes: Option<u64>,
        got_bytes: Option<u64>,
    },

    /// Нарушена внутренняя структура
    CorruptData {
        structure: String,
        reason: String,
        offset: Option<u64>,
        key: Option<String>,
    },

    /// LZF-блок распаковался не в заявленную длину
    DecompressionFailed {
        reason: String,
        expected_len: u64,
        got_len: Option<u64>,
        offset: Option<u64>,
        key: Option<String>,
    },

    /// Неизвестный байт в закрытой таблице кодировок
    UnsupportedEncoding {
        site: EncodingSite,
        tag: u8,
        offset: Option<u64>,
        key: Option<String>,
    },

    /// Неверная сигнатура в заголовке
    InvalidMagic { expected: [u8; 5], got: [u8; 5] },

    /// Номер версии не является четырьмя ASCII-цифрами
    InvalidVersion { got: [u8; 4] },

    /// Контрольная сумма не совпала
    ChecksumMismatch {
        computed: u64,
        recorded: u64,
        offset: Option<u64>,
    },

    /// Заявленная длина превышает настроенный предел
    SizeLimit {
        what: String,
        size: u64,
        limit: u64,
        offset: Option<u64>,
        key: Option<String>,
    },
}

impl RdbError {
    pub fn truncated(
        context: impl Into<String>,
        expected_bytes: u64,
        got_bytes: u64,
    ) -> Self {
        Self::TruncatedInput {
            context: context.into(),
            offset: None,
            key: None,
            expected_bytes: Some(expected_bytes),
            got_bytes: Some(got_bytes),
        }
    }

    pub fn corrupt(
        structure: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::CorruptData {
            structure: structure.into(),
            reason: reason.into(),
            offset: None,
            key: None,
        }
    }

    /// Неизвестный тег записи по заданному смещению.
    pub fn unsupported_tag(
        tag: u8,
        offset: u64,
    ) -> Self {
        Self::UnsupportedEncoding {
            site: EncodingSite::RecordTag,
            tag,
            offset: Some(offset),
            key: None,
        }
    }

    pub fn unsupported(
        site: EncodingSite,
        tag: u8,
    ) -> Self {
        Self::UnsupportedEncoding {
            site,
            tag,
            offset: None,
            key: None,
        }
    }

    /// Класс ошибки для вызывающего кода.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Self::UnsupportedEncoding { .. } => ErrorKind::UnsupportedEncoding,
            Self::CorruptData { .. }
            | Self::DecompressionFailed { .. }
            | Self::InvalidMagic { .. }
            | Self::InvalidVersion { .. }
            | Self::ChecksumMismatch { .. }
            | Self::SizeLimit { .. } => ErrorKind::CorruptData,
        }
    }

    /// Смещение в потоке, если известно.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::TruncatedInput { offset, .. }
            | Self::CorruptData { offset, .. }
            | Self::DecompressionFailed { offset, .. }
            | Self::UnsupportedEncoding { offset, .. }
            | Self::ChecksumMismatch { offset, .. }
            | Self::SizeLimit { offset, .. } => *offset,
            Self::InvalidMagic { .. } => Some(0),
            Self::InvalidVersion { .. } => Some(5),
        }
    }

    /// Неизвестный байт, если ошибка про кодировку.
    pub fn tag(&self) -> Option<u8> {
        match self {
            Self::UnsupportedEncoding { tag, .. } => Some(*tag),
            _ => None,
        }
    }

    /// Добавляет смещение, если оно ещё не задано.
    pub fn with_offset(
        mut self,
        offset: u64,
    ) -> Self {
        match &mut self {
            Self::TruncatedInput { offset: o, .. }
            | Self::CorruptData { offset: o, .. }
            | Self::DecompressionFailed { offset: o, .. }
            | Self::UnsupportedEncoding { offset: o, .. }
            | Self::ChecksumMismatch { offset: o, .. }
            | Self::SizeLimit { offset: o, .. } => {
                o.get_or_insert(offset);
            }
            Self::InvalidMagic { .. } | Self::InvalidVersion { .. } => {}
        }
        self
    }

    /// Добавляет ключ записи к ошибке.
    pub fn with_key(
        mut self,
        key: impl Into<String>,
    ) -> Self {
        let k = Some(key.into());
        match &mut self {
            Self::TruncatedInput { key: k2, .. }
            | Self::CorruptData { key: k2, .. }
            | Self::DecompressionFailed { key: k2, .. }
            | Self::UnsupportedEncoding { key: k2, .. }
            | Self::SizeLimit { key: k2, .. } => {
                *k2 = k;
            }
            _ => {}
        }
        self
    }

    pub fn recovery_hint(&self) -> Option<&'static str> {
        match self {
            Self::TruncatedInput { .. } => Some("File may be truncated. Check that the copy finished"),
            Self::ChecksumMismatch { .. } => {
                Some("File may be corrupted. Re-copy it or decode with checksum policy 'skip'")
            }
            Self::UnsupportedEncoding {
                site: EncodingSite::RecordTag,
                ..
            } => Some("Dump uses modules, streams or a newer type; these are not decoded"),
            Self::InvalidMagic { .. } => Some("Input is not an RDB dump"),
            Self::SizeLimit { .. } => Some("Raise max_blob_len if the dump is trusted"),
            _ => None,
        }
    }
}

impl std::fmt::Display for RdbError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::TruncatedInput {
                context,
                offset,
                key,
                expected_bytes,
                got_bytes,
            } => {
                write!(f, "Truncated input: {context}")?;
                if let (Some(exp), Some(got)) = (expected_bytes, got_bytes) {
                    write!(f, " (expected {exp} bytes, got {got})")?;
                }
                write_context(f, *offset, key.as_deref())
            }
            Self::CorruptData {
                structure,
                reason,
                offset,
                key,
            } => {
                write!(f, "Corrupt {structure}: {reason}")?;
                write_context(f, *offset, key.as_deref())
            }
            Self::DecompressionFailed {
                reason,
                expected_len,
                got_len,
                offset,
                key,
            } => {
                write!(f, "LZF decompression failed: {reason} (expected {expected_len} bytes")?;
                if let Some(got) = got_len {
                    write!(f, ", got {got}")?;
                }
                write!(f, ")")?;
                write_context(f, *offset, key.as_deref())
            }
            Self::UnsupportedEncoding {
                site,
                tag,
                offset,
                key,
            } => {
                write!(f, "Unsupported encoding 0x{tag:02X} ({site:?})")?;
                write_context(f, *offset, key.as_deref())
            }
            Self::InvalidMagic { expected, got } => write!(
                f,
                "Invalid magic: expected {:?}, got {:?}",
                String::from_utf8_lossy(expected),
                String::from_utf8_lossy(got)
            ),
            Self::InvalidVersion { got } => {
                write!(f, "Invalid version field: {:?}", String::from_utf8_lossy(got))
            }
            Self::ChecksumMismatch {
                computed,
                recorded,
                offset,
            } => {
                write!(
                    f,
                    "Checksum mismatch: computed 0x{computed:016X}, recorded 0x{recorded:016X}"
                )?;
                write_context(f, *offset, None)
            }
            Self::SizeLimit {
                what,
                size,
                limit,
                offset,
                key,
            } => {
                write!(f, "{what} size {size} exceeds limit {limit} bytes")?;
                write_context(f, *offset, key.as_deref())
            }
        }
    }
}

fn write_context(
    f: &mut std::fmt::Formatter<'_>,
    offset: Option<u64>,
    key: Option<&str>,
) -> std::fmt::Result {
    let mut parts = Vec::new();
    if let Some(o) = offset {
        parts.push(format!("offset: 0x{o:X}"));
    }
    if let Some(k) = key {
        parts.push(format!("key: {k}"));
    }
    if !parts.is_empty() {
        write!(f, " [{}]", parts.join(", "))?;
    }
    Ok(())
}

impl std::error::Error for RdbError {}

impl ErrorExt for RdbError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::TruncatedInput { .. } => StatusCode::UnexpectedEof,
            Self::CorruptData { .. } => StatusCode::CorruptedData,
            Self::DecompressionFailed { .. } => StatusCode::DecompressionFailed,
            Self::UnsupportedEncoding { .. } => StatusCode::UnsupportedEncoding,
            Self::InvalidMagic { .. } | Self::InvalidVersion { .. } => StatusCode::InvalidHeader,
            Self::ChecksumMismatch { .. } => StatusCode::ChecksumMismatch,
            Self::SizeLimit { .. } => StatusCode::SizeLimit,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<std::io::Error> for RdbError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => RdbError::TruncatedInput {
                context: e.to_string(),
                offset: None,
                key: None,
                expected_bytes: None,
                got_bytes: None,
            },
            _ => RdbError::corrupt("I/O", e.to_string()),
        }
    }
}
