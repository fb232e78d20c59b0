pub mod rdb_error;

use std::io;

pub use rdb_error::*;

use crate::{ErrorExt, StackError, StatusCode};

/// Сбой источника байтов, не связанный с форматом дампа.
#[derive(Debug, Clone)]
pub struct SourceError {
    code: StatusCode,
    message: String,
}

impl SourceError {
    pub fn new(
        code: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "read failed: {}", self.message)
    }
}

impl std::error::Error for SourceError {}

impl ErrorExt for SourceError {
    fn status_code(&self) -> StatusCode {
        self.code
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// `UnexpectedEof` становится [`RdbError::TruncatedInput`]: для вызывающего
/// это обрыв дампа. Остальное остаётся ошибкой окружения.
impl From<io::Error> for StackError {
    fn from(err: io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::UnexpectedEof => return StackError::new(RdbError::from(err)),
            io::ErrorKind::NotFound => StatusCode::NotFound,
            io::ErrorKind::PermissionDenied => StatusCode::PermissionDenied,
            _ => StatusCode::Io,
        };
        StackError::new(SourceError::new(code, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    /// Тест проверяет маппинг `io::ErrorKind` в коды статуса.
    #[test]
    fn test_io_error_kind_mapping() {
        let cases = [
            (io::ErrorKind::NotFound, StatusCode::NotFound),
            (io::ErrorKind::PermissionDenied, StatusCode::PermissionDenied),
            (io::ErrorKind::UnexpectedEof, StatusCode::UnexpectedEof),
            (io::ErrorKind::Interrupted, StatusCode::Io),
        ];

        for (kind, expected) in cases {
            let stack: StackError = io::Error::new(kind, "boom").into();
            assert_eq!(stack.status_code(), expected, "kind={kind:?}");
            assert!(stack.to_string().contains("boom"));
        }
    }

    /// Тест проверяет, что EOF источника виден как обрыв дампа.
    #[test]
    fn test_io_eof_is_truncated_input() {
        let stack: StackError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert_eq!(stack.kind(), Some(ErrorKind::TruncatedInput));
    }
}
