//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Upload ingestion CLI.
#[derive(Parser, Debug)]
#[command(
    name = "upload-ingest",
    version,
    about = "Store the files of a multipart/form-data request body",
    long_about = "Reads a captured multipart/form-data request body, checks every file part \
                  against the allowed content types and stores it in a directory.\n\n\
                  Use '-' as the body path to read the request from stdin."
)]
pub struct Args {
    /// Path to the request body, or '-' for stdin.
    pub body: PathBuf,

    /// Content-Type header of the request, including its boundary.
    #[arg(long = "content-type", env = "UPLOAD_CONTENT_TYPE")]
    pub content_type: String,

    /// Directory uploaded files are stored in.
    #[arg(short = 'd', long = "directory")]
    pub destination_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "ingest.toml")]
    pub config: PathBuf,

    /// Store files under their original names instead of random ones.
    #[arg(long)]
    pub keep_names: bool,

    /// Allowed content type. Can be given multiple times.
    #[arg(long = "allow", value_name = "TYPE")]
    pub allow: Vec<String>,

    /// Maximum request body size in bytes.
    #[arg(long = "max-size")]
    pub max_size: Option<u64>,

    /// Part bytes kept in memory before spooling to disk.
    #[arg(long = "max-memory")]
    pub max_memory: Option<u64>,

    /// Fail instead of replacing files that already exist.
    #[arg(long)]
    pub no_overwrite: bool,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(dir) = &self.destination_directory {
            config.options.destination_directory = Some(dir.clone());
        }

        if !self.allow.is_empty() {
            config.ingest.allowed_file_types = self.allow.iter().cloned().collect();
        }

        if let Some(max_size) = self.max_size {
            config.ingest.max_file_size = Some(max_size);
        }

        if let Some(max_memory) = self.max_memory {
            config.ingest.max_memory = Some(max_memory);
        }

        // Boolean flags (only override if set to non-default)
        if self.keep_names {
            config.options.rename = false;
        }

        if self.no_overwrite {
            config.ingest.overwrite_existing = false;
        }
    }

    /// Whether the body is read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.body.as_os_str() == "-"
    }
}
