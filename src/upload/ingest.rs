//! Upload ingestion: validate each file part of a request and store it on disk.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::config::IngestConfig;
use crate::error::{Error, IngestError, Result};
use crate::fs::{destination_name, ensure_dir, NameGenerator};
use crate::media::{detect_content_type, SNIFF_LEN};
use crate::upload::file::UploadedFile;
use crate::upload::form::{FilePart, MultipartForm, PartStream};
use crate::upload::request::UploadRequest;

/// Rename mode used when the caller has no preference.
pub const DEFAULT_RENAME: bool = true;

/// Copy buffer size for writing parts to disk.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Stores the file parts of multipart requests in a destination directory.
///
/// Holds only immutable configuration, so one ingestor can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct UploadIngestor {
    config: IngestConfig,
    names: NameGenerator,
}

impl UploadIngestor {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            names: NameGenerator::new(),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Store every file part of `request` in `destination`.
    ///
    /// Parts are processed in form order. The first failure stops processing; the
    /// error carries the files stored before it, which stay on disk.
    pub async fn ingest<S, O, E>(
        &self,
        request: UploadRequest<S>,
        destination: &Path,
        rename: bool,
    ) -> std::result::Result<Vec<UploadedFile>, IngestError>
    where
        S: Stream<Item = std::result::Result<O, E>> + Send + 'static,
        O: Into<Bytes> + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
    {
        let max_size = self.config.max_file_size();

        ensure_dir(destination).await?;

        let form = MultipartForm::parse(request, max_size, self.config.max_memory()).await?;
        tracing::debug!(
            "Parsed multipart form with {} file part(s) for {}",
            form.file_count(),
            destination.display()
        );

        self.store_parts(&form, destination, rename).await
    }

    async fn store_parts(
        &self,
        form: &MultipartForm,
        destination: &Path,
        rename: bool,
    ) -> std::result::Result<Vec<UploadedFile>, IngestError> {
        let mut uploaded = Vec::with_capacity(form.file_count());
        for part in form.files() {
            match self.store_part(part, destination, rename).await {
                Ok(file) => uploaded.push(file),
                Err(source) => {
                    tracing::debug!(
                        "Stopping after {} stored file(s): {}",
                        uploaded.len(),
                        source
                    );
                    return Err(IngestError { uploaded, source });
                }
            }
        }

        Ok(uploaded)
    }

    /// Store a single-file request and return its result.
    ///
    /// Returns [`Error::NoFileParts`] when the request has no file parts.
    pub async fn ingest_one<S, O, E>(
        &self,
        request: UploadRequest<S>,
        destination: &Path,
        rename: bool,
    ) -> Result<UploadedFile>
    where
        S: Stream<Item = std::result::Result<O, E>> + Send + 'static,
        O: Into<Bytes> + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
    {
        let files = self
            .ingest(request, destination, rename)
            .await
            .map_err(IngestError::into_source)?;

        files.into_iter().next().ok_or(Error::NoFileParts)
    }

    async fn store_part(
        &self,
        part: &FilePart,
        destination: &Path,
        rename: bool,
    ) -> Result<UploadedFile> {
        let original = part.file_name();
        let read_error = |source: std::io::Error| Error::PartRead {
            name: original.to_string(),
            source,
        };

        let mut reader = part.open().await.map_err(|source| Error::PartOpen {
            name: original.to_string(),
            source,
        })?;

        let head = read_head(&mut reader).await.map_err(read_error)?;
        let content_type = detect_content_type(&head);
        if !self.config.is_allowed(content_type) {
            return Err(Error::FileTypeNotAllowed {
                name: original.to_string(),
                content_type: content_type.to_string(),
            });
        }

        reader
            .seek(SeekFrom::Start(0))
            .await
            .map_err(read_error)?;

        let new_file_name = destination_name(&self.names, original, rename)?;
        let path = destination.join(&new_file_name);
        let file_size =
            write_part(&mut reader, &path, original, self.config.overwrite_existing).await?;

        tracing::debug!(
            "Stored '{}' as {} ({} bytes, {})",
            original,
            path.display(),
            file_size,
            content_type
        );

        Ok(UploadedFile {
            new_file_name,
            original_file_name: original.to_string(),
            file_size,
        })
    }
}

/// Read up to [`SNIFF_LEN`] leading bytes.
async fn read_head(reader: &mut Box<dyn PartStream>) -> std::io::Result<Vec<u8>> {
    let mut head = vec![0u8; SNIFF_LEN];
    let mut filled = 0;

    while filled < head.len() {
        let n = reader.read(&mut head[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    head.truncate(filled);
    Ok(head)
}

async fn create_file(path: &Path, overwrite: bool) -> Result<File> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    options.mode(crate::fs::FILE_MODE);

    options.open(path).await.map_err(|source| Error::FileCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// Create `path` and copy `reader` into it. A failed copy removes the file.
async fn write_part<R>(reader: &mut R, path: &Path, name: &str, overwrite: bool) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = create_file(path, overwrite).await?;

    match copy_part(reader, &mut file, name, path).await {
        Ok(size) => Ok(size),
        Err(e) => {
            drop(file);
            discard_partial(path).await;
            Err(e)
        }
    }
}

async fn copy_part<R>(
    reader: &mut R,
    file: &mut File,
    name: &str,
    path: &Path,
) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let write_error = |source: std::io::Error| Error::FileWrite {
        path: PathBuf::from(path),
        source,
    };

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut copied: u64 = 0;

    loop {
        let n = reader.read(&mut buffer).await.map_err(|source| Error::PartRead {
            name: name.to_string(),
            source,
        })?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n]).await.map_err(write_error)?;
        copied += n as u64;
    }

    file.flush().await.map_err(write_error)?;
    Ok(copied)
}

/// Remove an incompletely written destination file.
async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Failed to remove partial file {}: {}", path.display(), e);
    }
}
