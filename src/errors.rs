use thiserror::Error;

/// Errors originating from the cleaning pipeline or downstream layers (DB,
/// file I/O). Row-level filtering is never an error; these cover dataset- and
/// infrastructure-level failures only.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Structural dataset failure: missing mandatory columns, null target
    /// values, column mismatch after projection. Halts before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A trainable artifact is absent: signals "not yet trained" rather than
    /// "bad data", so callers can tell the two apart.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("database error: {0}")]
    Db(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XLSX error: {0}")]
    Xlsx(String),
}

// Type alias commonly used by pipeline stages.
pub type Result<T> = std::result::Result<T, PipelineError>;
