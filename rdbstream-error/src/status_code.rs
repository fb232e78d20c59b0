use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса ошибок декодера.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Внутренние сбои
/// - 2xxx: Ввод-вывод
/// - 5xxx: Содержимое дампа
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    Success = 0,

    Unknown = 1000,
    Internal = 1003,

    Io = 2000,
    NotFound = 2001,
    PermissionDenied = 2002,

    /// Неверная сигнатура или версия
    InvalidHeader = 5000,
    UnexpectedEof = 5001,
    CorruptedData = 5002,
    DecompressionFailed = 5003,
    UnsupportedEncoding = 5004,
    ChecksumMismatch = 5005,
    SizeLimit = 5006,
}

impl StatusCode {
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Вариант по числу; `None`, если такого кода нет.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Ошибка вызвана содержимым дампа, а не окружением.
    pub fn is_data_error(&self) -> bool {
        matches!(self.code(), 5000..=5999)
    }

    /// Ошибка окружения: файл, права, чтение.
    pub fn is_io_error(&self) -> bool {
        matches!(self.code(), 2000..=2999)
    }

    /// Код завершения процесса для `rdb-dump`.
    ///
    /// 0 — успех, 2 — окружение, 3 — дамп использует неподдерживаемую
    /// кодировку, 1 — всё остальное.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::UnsupportedEncoding => 3,
            _ if self.is_io_error() => 2,
            _ => 1,
        }
    }
}

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет конвертацию из числа.
    #[test]
    fn test_from_u32() {
        let n = StatusCode::UnexpectedEof.code();
        assert_eq!(StatusCode::from_u32(n), Some(StatusCode::UnexpectedEof));
        assert!(StatusCode::from_u32(4242).is_none());
    }

    /// Тест проверяет разделение ошибок данных и окружения.
    #[test]
    fn test_data_vs_io() {
        assert!(StatusCode::CorruptedData.is_data_error());
        assert!(StatusCode::UnexpectedEof.is_data_error());
        assert!(!StatusCode::Io.is_data_error());
        assert!(StatusCode::PermissionDenied.is_io_error());
        assert!(!StatusCode::Internal.is_io_error());
    }

    /// Тест проверяет коды завершения.
    #[test]
    fn test_exit_codes() {
        assert_eq!(StatusCode::Success.exit_code(), 0);
        assert_eq!(StatusCode::ChecksumMismatch.exit_code(), 1);
        assert_eq!(StatusCode::NotFound.exit_code(), 2);
        assert_eq!(StatusCode::UnsupportedEncoding.exit_code(), 3);
    }

    /// Тест проверяет, что `Display` содержит имя и числовой код.
    #[test]
    fn test_display_contains_name_and_code() {
        let s = StatusCode::SizeLimit.to_string();
        assert!(s.contains("5006"), "got: {s}");
        assert!(s.contains("SizeLimit"), "got: {s}");
    }
}
