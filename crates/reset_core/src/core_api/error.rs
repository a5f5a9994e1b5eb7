use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Validation,
    Parse,
    LineTooLong,
    DuplicateId,
    Io,
    MissingAsset,
    AssetConflict,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::Validation, message)
    }

    /// Wraps an I/O failure with the action and path that produced it.
    pub fn io(action: &str, path: &Path, err: io::Error) -> Self {
        Self::new(
            CoreErrorCode::Io,
            format!("error {action} {}: {err}", path.display()),
        )
    }
}
