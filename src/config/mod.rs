//! Configuration module for upload ingestion.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Default limits
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{Config, IngestConfig, OptionsConfig, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_MEMORY};
pub use validation::{validate_config, validate_content_types, validate_ingest};
