//! Destination directory management.

use std::path::Path;

use crate::error::{Error, Result};

/// Permission bits for created directories.
pub const DIR_MODE: u32 = 0o755;

/// Permission bits for stored files.
pub const FILE_MODE: u32 = 0o644;

/// Ensure a directory exists, creating it and any parents if necessary.
///
/// An existing directory is left untouched. An existing non-directory at `path` is an
/// error.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    let dir_error = |source: std::io::Error| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    };

    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(dir_error(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "path exists and is not a directory",
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(dir_error(e)),
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    builder.create(path).await.map_err(dir_error)?;
    tracing::debug!("Created directory {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_dir_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b").join("c");

        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("uploads");

        ensure_dir(&dir).await.unwrap();
        ensure_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_dir_rejects_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();

        let err = ensure_dir(&file).await.unwrap_err();
        assert!(matches!(err, Error::DirectoryCreate { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_dir_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("uploads");
        ensure_dir(&dir).await.unwrap();

        let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        // The process umask may only remove bits.
        assert_eq!(mode & !DIR_MODE, 0);
    }
}
