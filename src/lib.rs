//! Upload Ingest - multipart file ingestion for HTTP services
//!
//! This library stores the files of a `multipart/form-data` request in a directory.
//!
//! # Features
//!
//! - Content type sniffing from leading bytes, checked against an allow-list
//! - Random collision-avoiding file names that keep the original extension
//! - Request size limit enforced before anything is written
//! - Partial results when a later part fails
//! - Spooling of large parts to temporary files
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use upload_ingest::{IngestConfig, UploadIngestor, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IngestConfig {
//!         allowed_file_types: ["image/png".to_string()].into_iter().collect(),
//!         ..Default::default()
//!     };
//!     let ingestor = UploadIngestor::new(config);
//!
//!     let body = std::fs::read("request.bin")?;
//!     let request = UploadRequest::from_bytes("multipart/form-data; boundary=X", body);
//!     let files = ingestor.ingest(request, Path::new("uploads"), true).await?;
//!
//!     for file in files {
//!         println!("{} -> {} ({} bytes)", file.original_file_name, file.new_file_name, file.file_size);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;
pub mod upload;

// Re-exports for convenience
pub use config::{Config, IngestConfig};
pub use error::{Error, IngestError, Result};
pub use fs::NameGenerator;
pub use media::detect_content_type;
pub use upload::{UploadIngestor, UploadRequest, UploadedFile, DEFAULT_RENAME};
