//! Configuration structures and loading logic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Request size limit applied when none is configured (1 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Bytes of part data kept in memory before spooling to disk (32 MiB).
pub const DEFAULT_MAX_MEMORY: u64 = 32 * 1024 * 1024;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Ingestion limits and validation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum size of a whole multipart request body, in bytes.
    #[serde(default)]
    pub max_file_size: Option<u64>,

    /// Content types accepted after sniffing. Empty allows every type.
    #[serde(default)]
    pub allowed_file_types: HashSet<String>,

    /// Part bytes buffered in memory before parts are spooled to temporary files.
    #[serde(default)]
    pub max_memory: Option<u64>,

    /// Whether an existing destination file is truncated and replaced.
    #[serde(default = "default_true")]
    pub overwrite_existing: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: None,
            allowed_file_types: HashSet::new(),
            max_memory: None,
            overwrite_existing: true,
        }
    }
}

impl IngestConfig {
    /// Effective request size limit.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Effective in-memory buffering threshold.
    pub fn max_memory(&self) -> u64 {
        self.max_memory.unwrap_or(DEFAULT_MAX_MEMORY)
    }

    /// Whether a sniffed content type passes the allow-list.
    pub fn is_allowed(&self, content_type: &str) -> bool {
        self.allowed_file_types.is_empty()
            || self
                .allowed_file_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

/// Command-line facing options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Directory uploaded files are written to.
    #[serde(default)]
    pub destination_directory: Option<PathBuf>,

    /// Whether stored files get random names.
    #[serde(default = "default_true")]
    pub rename: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            destination_directory: None,
            rename: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective destination directory.
    pub fn destination_directory(&self) -> PathBuf {
        self.options
            .destination_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("uploads"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.max_file_size(), DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.max_memory(), DEFAULT_MAX_MEMORY);
        assert!(config.overwrite_existing);
        assert!(config.is_allowed("application/x-anything"));
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        let config = IngestConfig {
            allowed_file_types: ["image/PNG".to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert!(config.is_allowed("image/png"));
        assert!(!config.is_allowed("image/jpeg"));
    }

    #[test]
    fn test_load_and_save() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ingest.toml");
        std::fs::write(
            &path,
            r#"
[ingest]
max_file_size = 2048
allowed_file_types = ["image/png", "image/jpeg"]

[options]
destination_directory = "/srv/uploads"
rename = false
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.ingest.max_file_size(), 2048);
        assert_eq!(config.ingest.allowed_file_types.len(), 2);
        assert!(config.ingest.overwrite_existing);
        assert!(!config.options.rename);
        assert_eq!(config.destination_directory(), PathBuf::from("/srv/uploads"));

        config.save(&path).unwrap();
        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.ingest.max_file_size, Some(2048));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/ingest.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.options.rename);
        assert_eq!(config.destination_directory(), PathBuf::from("uploads"));
    }
}
