use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlContextError {
    #[error("Type not supported as a parameter: {0}")]
    TypeNotSupported(String),

    #[error("No mapper registered for type: {0}")]
    NotMapped(String),

    #[error("Cannot cast {found} value to {expected}")]
    CastFailed {
        expected: &'static str,
        found: &'static str,
    },

    #[error("SQL execution error: {0}")]
    ExecutionFailed(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Parameter count mismatch: {placeholders} unbound placeholder(s), {values} value(s)")]
    ParameterMismatch { placeholders: usize, values: usize },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SqlContextError {
    /// Wrap a client-level failure as `ExecutionFailed`, keeping its message.
    pub fn execution(err: impl std::fmt::Display) -> Self {
        SqlContextError::ExecutionFailed(err.to_string())
    }
}
