//! Incoming upload requests.

use bytes::Bytes;
use futures::stream::{self, Stream};

use crate::error::{Error, Result};

/// Body stream for a request held fully in memory.
pub type BytesBody =
    stream::Once<futures::future::Ready<std::result::Result<Bytes, std::io::Error>>>;

/// A multipart request: its `Content-Type` header value and its body stream.
///
/// The HTTP layer builds one of these per request; the body is consumed by ingestion.
pub struct UploadRequest<S> {
    content_type: String,
    body: S,
}

impl<S> UploadRequest<S> {
    pub fn new(content_type: impl Into<String>, body: S) -> Self {
        Self {
            content_type: content_type.into(),
            body,
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Extract the multipart boundary from the content type.
    pub fn boundary(&self) -> Result<String> {
        multer::parse_boundary(self.content_type())
            .map_err(|e| Error::MalformedRequest(format!("{} ('{}')", e, self.content_type())))
    }

    pub fn into_body(self) -> S {
        self.body
    }
}

impl UploadRequest<BytesBody> {
    /// Build a request from a complete in-memory body.
    pub fn from_bytes(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(
            content_type,
            stream::once(futures::future::ready(Ok(body.into()))),
        )
    }
}

impl<S, O, E> UploadRequest<S>
where
    S: Stream<Item = std::result::Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    /// Start multipart parsing with a limit on the whole body size.
    pub(crate) fn into_multipart(self, max_size: u64) -> Result<multer::Multipart<'static>> {
        let boundary = self.boundary()?;
        let constraints = multer::Constraints::new()
            .size_limit(multer::SizeLimit::new().whole_stream(max_size));

        Ok(multer::Multipart::with_constraints(
            self.into_body(),
            boundary,
            constraints,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary() {
        let request = UploadRequest::from_bytes("multipart/form-data; boundary=XyZ", "");
        assert_eq!(request.boundary().unwrap(), "XyZ");
    }

    #[test]
    fn test_accessors() {
        let request = UploadRequest::new("multipart/form-data; boundary=b", vec![1u8, 2]);
        assert_eq!(request.content_type(), "multipart/form-data; boundary=b");
        assert_eq!(request.into_body(), vec![1u8, 2]);
    }

    #[test]
    fn test_boundary_missing() {
        let request = UploadRequest::from_bytes("multipart/form-data", "");
        assert!(matches!(request.boundary(), Err(Error::MalformedRequest(_))));

        let request = UploadRequest::from_bytes("application/json", "{}");
        assert!(matches!(request.boundary(), Err(Error::MalformedRequest(_))));
    }
}
