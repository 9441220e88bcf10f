use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur at the serialization boundary.
///
/// Classification and derivation are total and never fail; errors only
/// arise when rendering or writing a document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export format error
    #[error("Export format error: {0}")]
    Export(String),
}

impl SchemaError {
    /// Create a new export format error
    pub fn export_error<T: ToString>(msg: T) -> Self {
        Self::Export(msg.to_string())
    }
}
