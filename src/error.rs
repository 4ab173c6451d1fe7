//! Error types for the upload-ingest crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::upload::UploadedFile;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // Request errors
    #[error("Request body exceeds the configured limit of {limit} bytes")]
    RequestTooLarge { limit: u64 },

    #[error("Malformed multipart request: {0}")]
    MalformedRequest(String),

    #[error("Request contains no file parts")]
    NoFileParts,

    // Part errors
    #[error("Failed to open part '{name}': {source}")]
    PartOpen {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read part '{name}': {source}")]
    PartRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File type not allowed: '{name}' was detected as {content_type}")]
    FileTypeNotAllowed { name: String, content_type: String },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // File system errors
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {}: {source}", path.display())]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Name generation
    #[error("Entropy source unavailable: {0}")]
    EntropySourceUnavailable(#[from] rand::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a multi-part ingestion, carrying every file stored before the failure.
///
/// Files in `uploaded` are complete on disk; nothing is rolled back.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct IngestError {
    pub uploaded: Vec<UploadedFile>,
    #[source]
    pub source: Error,
}

impl IngestError {
    /// An ingestion failure before any part was stored.
    pub fn empty(source: Error) -> Self {
        Self {
            uploaded: Vec::new(),
            source,
        }
    }

    /// Discard the partial results and keep the underlying error.
    pub fn into_source(self) -> Error {
        self.source
    }
}

impl From<Error> for IngestError {
    fn from(source: Error) -> Self {
        Self::empty(source)
    }
}

/// Process exit codes used by the CLI.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const REQUEST_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const STORAGE_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
