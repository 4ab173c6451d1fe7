//! Stored file results.

use serde::{Deserialize, Serialize};

/// A file part that was fully written to the destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Name of the file inside the destination directory.
    pub new_file_name: String,
    /// File name declared by the client.
    pub original_file_name: String,
    /// Bytes written.
    pub file_size: u64,
}
