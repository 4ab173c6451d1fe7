//! Upload module.
//!
//! Provides:
//! - Multipart request parsing under a size limit
//! - Per-part validation and storage
//! - Stored file results

pub mod file;
pub mod form;
pub mod ingest;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

pub use file::UploadedFile;
pub use form::{FilePart, MultipartForm, PartBody, PartStream};
pub use ingest::{UploadIngestor, DEFAULT_RENAME};
pub use request::{BytesBody, UploadRequest};
