//! Upload result reporting.

use std::path::Path;

use console::style;

use crate::error::Result;
use crate::output::console::print_success;
use crate::upload::UploadedFile;

/// Print one line per stored file followed by a totals line.
pub fn print_uploaded(files: &[UploadedFile], destination: &Path) {
    for file in files {
        print_success(&format!(
            "{} -> {} ({} bytes)",
            file.original_file_name,
            destination.join(&file.new_file_name).display(),
            file.file_size
        ));
    }

    let total: u64 = files.iter().map(|f| f.file_size).sum();
    println!(
        "Stored: {} file(s), {} bytes",
        style(files.len()).green(),
        style(total).green()
    );
}

/// Print stored files as a JSON array.
pub fn print_json(files: &[UploadedFile]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(files)?);
    Ok(())
}
