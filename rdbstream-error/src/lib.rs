pub mod ext;
pub mod stack;
pub mod status_code;
pub mod types;

pub use ext::*;
pub use stack::*;
pub use status_code::*;
pub use types::*;

/// Результат любой операции декодера.
pub type RdbResult<T> = Result<T, StackError>;
