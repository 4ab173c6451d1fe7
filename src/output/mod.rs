//! Output module for console output.
//!
//! Provides:
//! - Colored console output
//! - Upload result reporting

pub mod console;
pub mod report;

pub use console::{print_error, print_info, print_success, print_warning};
pub use report::{print_json, print_uploaded};
