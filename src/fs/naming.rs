//! Destination filename generation and validation.

use crate::error::{Error, Result};
use crate::fs::random::{NameGenerator, RENAMED_STEM_LENGTH};

/// Validate a destination filename without rewriting it.
///
/// Returns an error if the name could escape the destination directory or cannot be
/// created as a single path component.
pub fn validate_filename(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    // Reject path traversal attempts
    if name == "." || name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    Ok(())
}

/// Extension of a filename, including the leading dot.
///
/// Only the final path component is considered; returns an empty string when it has
/// no dot.
pub fn extension(filename: &str) -> &str {
    let base_start = filename
        .rfind(|c: char| c == '/' || c == '\\')
        .map(|p| p + 1)
        .unwrap_or(0);
    let base = &filename[base_start..];

    match base.rfind('.') {
        Some(dot_pos) => &base[dot_pos..],
        None => "",
    }
}

/// Pick the destination name for an uploaded file.
///
/// With `rename`, a random stem replaces the original stem and the original extension
/// is kept as-is. Otherwise the original name is used verbatim. Either way the result
/// is validated.
pub fn destination_name(names: &NameGenerator, original: &str, rename: bool) -> Result<String> {
    let name = if rename {
        format!("{}{}", names.generate(RENAMED_STEM_LENGTH)?, extension(original))
    } else {
        original.to_string()
    };

    validate_filename(&name)?;
    Ok(name)
}
