use serde::Serialize;
use thiserror::Error;

/// Structured error type for the crate. Serialized with a `code` tag so
/// callers on the other side of an IPC or JSON boundary can match on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "code", content = "detail")]
pub enum OverloadError {
    /// A second hook registration while one is still active.
    #[error("packet hook is already registered by {holder}")]
    HookAlreadyRegistered { holder: String },

    /// Raised by a [`crate::recipient::Recipient`] that can no longer answer
    /// permission queries (e.g. a disconnected client).
    #[error("invalid recipient {recipient}: {reason}")]
    InvalidRecipient { recipient: String, reason: String },

    #[error("argument order error at position {position}: {message}")]
    ArgumentOrder { position: usize, message: String },

    #[error("sub-command with same name / alias for '{key}' already exists on /{command}")]
    DuplicateSubCommand { command: String, key: String },

    #[error("command with same name / alias for '{key}' already exists")]
    DuplicateCommand { key: String },

    #[error("command {name} not found")]
    CommandNotFound { name: String },

    #[error("soft enum {name} not found")]
    SoftEnumNotFound { name: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("JSON error: {message}")]
    Json { message: String },

    #[error("{message}")]
    Validation { message: String },
}

impl From<std::io::Error> for OverloadError {
    fn from(e: std::io::Error) -> Self {
        OverloadError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for OverloadError {
    fn from(e: serde_json::Error) -> Self {
        OverloadError::Json {
            message: e.to_string(),
        }
    }
}
