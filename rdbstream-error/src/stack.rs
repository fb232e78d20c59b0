use std::{fmt, panic::Location, sync::Arc};

use crate::{ErrorExt, ErrorKind, RdbError, StatusCode};

/// Ошибка с цепочкой контекстов.
///
/// Корневая ошибка хранится за `Arc`, поэтому `StackError` дёшево клонируется.
/// Каждый вызов [`StackError::context`] добавляет сообщение и место вызова.
#[derive(Clone)]
pub struct StackError {
    inner: Arc<dyn ErrorExt>,
    contexts: Arc<Vec<ErrorContext>>,
}

/// Один уровень контекста.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub message: String,
    pub location: &'static Location<'static>,
}

impl StackError {
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            inner: Arc::new(err),
            contexts: Arc::new(Vec::new()),
        }
    }

    #[track_caller]
    pub fn context(
        mut self,
        msg: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.contexts).push(ErrorContext {
            message: msg.into(),
            location: Location::caller(),
        });
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.inner.status_code()
    }

    pub fn contexts(&self) -> &[ErrorContext] {
        &self.contexts
    }

    pub fn downcast_ref<T: ErrorExt + 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Корневая ошибка формата, если она есть.
    pub fn rdb_error(&self) -> Option<&RdbError> {
        self.downcast_ref::<RdbError>()
    }

    /// Класс ошибки формата; для сбоев окружения `None`.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.rdb_error().map(RdbError::kind)
    }

    /// Меняет корневую ошибку формата, сохраняя контексты.
    pub fn map_rdb(
        self,
        f: impl FnOnce(RdbError) -> RdbError,
    ) -> Self {
        match self.rdb_error() {
            Some(rdb) => Self {
                inner: Arc::new(f(rdb.clone())),
                contexts: self.contexts,
            },
            None => self,
        }
    }
}

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut debug = f.debug_struct("StackError");
        debug.field("inner", &self.inner.to_string());
        debug.field("status_code", &self.status_code());

        if !self.contexts.is_empty() {
            let contexts: Vec<String> = self
                .contexts
                .iter()
                .map(|c| format!("{} ({}:{})", c.message, c.location.file(), c.location.line()))
                .collect();
            debug.field("contexts", &contexts);
        }

        debug.finish()
    }
}

impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for ctx in self.contexts.iter().rev() {
            write!(f, "{}: ", ctx.message)?;
        }
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl<E: ErrorExt> From<E> for StackError {
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truncated() -> RdbError {
        RdbError::TruncatedInput {
            context: "reading length".to_string(),
            offset: Some(9),
            key: None,
            expected_bytes: Some(4),
            got_bytes: Some(1),
        }
    }

    /// Тест проверяет порядок контекстов и место вызова.
    #[test]
    fn test_context_chain() {
        let stack = StackError::new(truncated())
            .context("decoding list")
            .context("pulling event");

        assert_eq!(stack.contexts().len(), 2);
        assert_eq!(stack.contexts()[0].message, "decoding list");
        assert!(stack.contexts()[0].location.file().ends_with("stack.rs"));
    }

    /// Тест проверяет класс и код через стек.
    #[test]
    fn test_kind_through_stack() {
        let stack: StackError = truncated().into();
        assert_eq!(stack.kind(), Some(ErrorKind::TruncatedInput));
        assert_eq!(stack.status_code(), StatusCode::UnexpectedEof);
    }

    /// Тест проверяет, что внешний контекст печатается первым.
    #[test]
    fn test_display_outer_context_first() {
        let stack = StackError::new(truncated())
            .context("reading record key")
            .context("record 3");
        let display = stack.to_string();
        assert!(display.starts_with("record 3: reading record key: "), "{display}");
        assert!(display.contains("Truncated input"));
    }

    /// Тест проверяет, что `map_rdb` сохраняет контексты.
    #[test]
    fn test_map_rdb_keeps_contexts() {
        let stack = StackError::new(truncated())
            .context("reading record key")
            .map_rdb(|e| e.with_key("user:1"));

        assert_eq!(stack.contexts().len(), 1);
        match stack.rdb_error() {
            Some(RdbError::TruncatedInput { key, .. }) => {
                assert_eq!(key.as_deref(), Some("user:1"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    /// Тест проверяет сбой окружения: класса формата у него нет.
    #[test]
    fn test_non_format_error_has_no_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let stack: StackError = io.into();
        assert_eq!(stack.kind(), None);
        assert_eq!(stack.status_code(), StatusCode::PermissionDenied);
    }
}
