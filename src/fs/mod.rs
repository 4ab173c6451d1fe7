//! Filesystem module.
//!
//! Provides:
//! - Destination directory management
//! - Filename generation and validation
//! - Random name generation

pub mod naming;
pub mod paths;
pub mod random;

pub use naming::{destination_name, extension, validate_filename};
pub use paths::{ensure_dir, DIR_MODE, FILE_MODE};
pub use random::{generate_with, NameGenerator, ALPHABET, RENAMED_STEM_LENGTH};
