//! Engine-wide error type. Every fallible public operation returns
//! `Result<T, EngineError>`; internal plumbing that never crosses the session
//! boundary uncategorized may use `anyhow::Result` and convert via
//! [`EngineError::Internal`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse SQL query: {0}")]
    Parse(String),

    #[error("unsupported statement type: {0}")]
    Unsupported(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("lowering error: {0}")]
    Lowering(String),

    #[error("value error: {0}")]
    Value(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    #[must_use]
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    #[must_use]
    pub fn lowering(msg: impl Into<String>) -> Self {
        Self::Lowering(msg.into())
    }

    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
