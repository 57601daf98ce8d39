use std::path::PathBuf;
use thiserror::Error;

/// Problems reading the startup configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Could not read env file '{}': {reason}", path.display())]
    EnvFile { path: PathBuf, reason: String },

    #[error("Path error: {0}")]
    Path(String),
}

/// Failures while turning CSV bytes into a dataset or filtering it.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' not found in CSV header")]
    MissingColumn(String),

    #[error("Row {row}: column '{column}' holds non-numeric value '{value}'")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} failed: {message}")]
    Transfer { operation: String, message: String },

    #[error("Parse error: {0}")]
    Parse(#[from] TableError),

    #[error("Invalid path '{0}', expected 'bucket/key'")]
    PathFormat(String),

    #[error("Local file does not exist: {}", .0.display())]
    LocalFileMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected endpoint format '{endpoint}': {reason}")]
    EndpointFormat { endpoint: String, reason: String },

    #[error("Failed to create presigned URL: {0}")]
    Presign(String),

    #[error("Invalid request: {0}")]
    Request(String),
}

impl StorageError {
    pub fn transfer(operation: &str, message: impl Into<String>) -> Self {
        StorageError::Transfer {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ObjstoreCsvMgrError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Refusing to {0}")]
    Refused(String),
}
