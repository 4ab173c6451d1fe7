//! Configuration validation logic.

use std::sync::OnceLock;

use crate::config::loader::{Config, IngestConfig};
use crate::error::{Error, Result};
use regex::Regex;

/// `type/subtype` with optional parameters, per RFC 6838 token rules.
fn mime_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+-]*(\s*;\s*[^;\s=]+=[^;\s]+)*$")
            .expect("valid MIME regex")
    })
}

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_ingest(&config.ingest)?;

    if let Some(dir) = &config.options.destination_directory {
        if dir.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                field: "destination_directory".to_string(),
                message: "Destination directory cannot be empty".to_string(),
            });
        }
    }

    Ok(())
}

/// Validate ingestion limits and the allow-list.
pub fn validate_ingest(config: &IngestConfig) -> Result<()> {
    if config.max_file_size == Some(0) {
        return Err(Error::ConfigValidation {
            field: "max_file_size".to_string(),
            message: "Maximum file size must be greater than zero".to_string(),
        });
    }

    if config.max_memory == Some(0) {
        return Err(Error::ConfigValidation {
            field: "max_memory".to_string(),
            message: "Memory threshold must be greater than zero".to_string(),
        });
    }

    validate_content_types(&config.allowed_file_types)
}

/// Validate allowed content types.
pub fn validate_content_types<S: AsRef<str>, I: IntoIterator<Item = S>>(types: I) -> Result<()> {
    for content_type in types {
        let content_type = content_type.as_ref();
        if !mime_pattern().is_match(content_type.trim()) {
            return Err(Error::ConfigValidation {
                field: "allowed_file_types".to_string(),
                message: format!(
                    "'{}' is not a valid content type (expected type/subtype)",
                    content_type
                ),
            });
        }
    }

    Ok(())
}
