//! Upload Ingest - CLI entry point.

use std::process::ExitCode;

use bytes::Bytes;
use clap::Parser;
use futures::Stream;
use tokio_util::io::ReaderStream;
use tracing_subscriber::{fmt, EnvFilter};

use upload_ingest::{
    cli::Args,
    config::{validate_config, Config},
    error::{exit_codes, Error, IngestError, Result},
    output::{print_error, print_info, print_json, print_uploaded, print_warning},
    upload::{UploadIngestor, UploadRequest},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

fn exit_code(error: &Error) -> i32 {
    match error {
        Error::Config(_) | Error::ConfigValidation { .. } | Error::TomlParse(_) => {
            exit_codes::CONFIG_ERROR
        }
        Error::RequestTooLarge { .. }
        | Error::MalformedRequest(_)
        | Error::NoFileParts
        | Error::PartOpen { .. }
        | Error::PartRead { .. }
        | Error::FileTypeNotAllowed { .. }
        | Error::InvalidFilename(_) => exit_codes::REQUEST_ERROR,
        Error::DirectoryCreate { .. } | Error::FileCreate { .. } | Error::FileWrite { .. } => {
            exit_codes::STORAGE_ERROR
        }
        _ => exit_codes::UNEXPECTED_ERROR,
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        tracing::debug!(
            "Configuration file not found: {}, using defaults",
            args.config.display()
        );
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    if args.reads_stdin() {
        ingest_body(&args, &config, ReaderStream::new(tokio::io::stdin())).await
    } else {
        let file = tokio::fs::File::open(&args.body).await?;
        ingest_body(&args, &config, ReaderStream::new(file)).await
    }
}

async fn ingest_body<S>(args: &Args, config: &Config, body: S) -> Result<()>
where
    S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
{
    let destination = config.destination_directory();
    let ingestor = UploadIngestor::new(config.ingest.clone());
    let request = UploadRequest::new(args.content_type.clone(), body);
    tracing::debug!(
        "Request limit {} bytes, in-memory threshold {} bytes, {} allowed type(s)",
        ingestor.config().max_file_size(),
        ingestor.config().max_memory(),
        ingestor.config().allowed_file_types.len()
    );

    if !args.json {
        print_info(&format!("Storing uploads in {}", destination.display()));
    }

    let (files, error) = match ingestor
        .ingest(request, &destination, config.options.rename)
        .await
    {
        Ok(files) => (files, None),
        Err(IngestError { uploaded, source }) => (uploaded, Some(source)),
    };

    if args.json {
        print_json(&files)?;
    } else if !files.is_empty() || error.is_none() {
        print_uploaded(&files, &destination);
    }

    match error {
        Some(error) => {
            if !files.is_empty() {
                print_warning(&format!(
                    "{} file(s) were stored before the failure",
                    files.len()
                ));
            }
            Err(error)
        }
        None => Ok(()),
    }
}
