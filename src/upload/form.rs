//! Parsed multipart forms.
//!
//! The whole request is parsed before any part is stored, so a request over the size
//! limit never leaves files behind. Part data stays in memory up to a threshold and is
//! spooled to anonymous temporary files beyond it.

use std::io::{Cursor, SeekFrom};

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::upload::request::UploadRequest;

/// Readable, seekable stream over a part's data.
pub trait PartStream: AsyncRead + AsyncSeek + Unpin + Send {}

impl<T: AsyncRead + AsyncSeek + Unpin + Send> PartStream for T {}

/// Storage backing a buffered file part.
#[derive(Debug)]
pub enum PartBody {
    Memory(Bytes),
    Spooled(std::fs::File),
}

/// One uploaded file within a form.
#[derive(Debug)]
pub struct FilePart {
    field_name: String,
    file_name: String,
    content_type: Option<String>,
    size: u64,
    body: PartBody,
}

impl FilePart {
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        body: PartBody,
    ) -> std::io::Result<Self> {
        let size = match &body {
            PartBody::Memory(bytes) => bytes.len() as u64,
            PartBody::Spooled(file) => file.metadata()?.len(),
        };

        Ok(Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content_type,
            size,
            body,
        })
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// File name declared by the client.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Content type declared by the client. Not trusted for validation.
    pub fn declared_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_spooled(&self) -> bool {
        matches!(self.body, PartBody::Spooled(_))
    }

    /// Open a stream positioned at the start of the part's data.
    pub async fn open(&self) -> std::io::Result<Box<dyn PartStream>> {
        match &self.body {
            PartBody::Memory(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            PartBody::Spooled(file) => {
                let mut file = tokio::fs::File::from_std(file.try_clone()?);
                file.seek(SeekFrom::Start(0)).await?;
                Ok(Box::new(file))
            }
        }
    }
}

/// A parsed multipart form.
///
/// Fields keep the order in which their names first appear; parts sharing a field name
/// keep their order within that field.
#[derive(Debug, Default)]
pub struct MultipartForm {
    values: Vec<(String, Vec<String>)>,
    files: Vec<(String, Vec<FilePart>)>,
}

impl MultipartForm {
    /// Parse a request body, failing with [`Error::RequestTooLarge`] past `max_size`
    /// bytes. At most `max_memory` bytes of part data are held in memory.
    pub async fn parse<S, O, E>(
        request: UploadRequest<S>,
        max_size: u64,
        max_memory: u64,
    ) -> Result<Self>
    where
        S: Stream<Item = std::result::Result<O, E>> + Send + 'static,
        O: Into<Bytes> + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
    {
        let mut multipart = request.into_multipart(max_size)?;
        let mut form = MultipartForm::default();
        let mut memory_left = max_memory;

        while let Some(mut field) = multipart.next_field().await.map_err(map_multer)? {
            // Parts without a form name are not part of the form.
            let Some(field_name) = field.name().map(str::to_string) else {
                continue;
            };

            // A file input left blank arrives with an empty filename; keep it as a value.
            let Some(file_name) = field
                .file_name()
                .filter(|name| !name.trim().is_empty())
                .map(str::to_string)
            else {
                let value = field.text().await.map_err(map_multer)?;
                memory_left = memory_left.saturating_sub(value.len() as u64);
                form.push_value(field_name, value);
                continue;
            };
            let content_type = field.content_type().map(|m| m.to_string());

            let mut buffer = BytesMut::new();
            let mut spool: Option<tokio::fs::File> = None;
            let mut size: u64 = 0;

            while let Some(chunk) = field.chunk().await.map_err(map_multer)? {
                size += chunk.len() as u64;
                match spool.as_mut() {
                    Some(file) => file.write_all(&chunk).await?,
                    None if size > memory_left => {
                        let mut file = tokio::fs::File::from_std(tempfile::tempfile()?);
                        file.write_all(&buffer).await?;
                        file.write_all(&chunk).await?;
                        buffer.clear();
                        spool = Some(file);
                    }
                    None => buffer.extend_from_slice(&chunk),
                }
            }

            let body = match spool {
                Some(mut file) => {
                    file.flush().await?;
                    tracing::debug!("Spooled part '{}' ({} bytes) to disk", file_name, size);
                    PartBody::Spooled(file.into_std().await)
                }
                None => {
                    memory_left -= size;
                    PartBody::Memory(buffer.freeze())
                }
            };

            form.push_file(FilePart::new(field_name, file_name, content_type, body)?);
        }

        Ok(form)
    }

    fn push_value(&mut self, field_name: String, value: String) {
        match self.values.iter_mut().find(|(name, _)| *name == field_name) {
            Some((_, values)) => values.push(value),
            None => self.values.push((field_name, vec![value])),
        }
    }

    /// Add a file part under its field name.
    pub fn push_file(&mut self, part: FilePart) {
        match self
            .files
            .iter_mut()
            .find(|(name, _)| name == part.field_name())
        {
            Some((_, parts)) => parts.push(part),
            None => self.files.push((part.field_name().to_string(), vec![part])),
        }
    }

    /// Every file part, in form order.
    pub fn files(&self) -> impl Iterator<Item = &FilePart> {
        self.files.iter().flat_map(|(_, parts)| parts.iter())
    }

    /// File parts submitted under `field_name`.
    pub fn files_for(&self, field_name: &str) -> &[FilePart] {
        self.files
            .iter()
            .find(|(name, _)| name == field_name)
            .map(|(_, parts)| parts.as_slice())
            .unwrap_or_default()
    }

    pub fn file_count(&self) -> usize {
        self.files.iter().map(|(_, parts)| parts.len()).sum()
    }

    /// First value of a non-file field.
    pub fn value(&self, field_name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field_name)
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

fn map_multer(err: multer::Error) -> Error {
    match err {
        multer::Error::StreamSizeExceeded { limit }
        | multer::Error::FieldSizeExceeded { limit, .. } => Error::RequestTooLarge { limit },
        multer::Error::StreamReadFailed(source) => Error::PartRead {
            name: "request body".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, source),
        },
        other => Error::MalformedRequest(other.to_string()),
    }
}
