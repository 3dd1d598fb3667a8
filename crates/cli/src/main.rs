use anyhow::Context;
use base64::{engine::general_purpose, Engine as _};
use clap::{Parser, Subcommand};
use lake_core::config::{
    data_dir_from_env_value, fingerprint_length_from_env_value,
    segment_terminators_from_env_value,
};
use lake_core::constants::{
    DATA_DIR_ENV, FINGERPRINT_LENGTH_ENV, SEGMENT_TERMINATORS_ENV,
};
use lake_core::{
    FileFingerprintStore, FileIdentityIndex, InMemoryFingerprintStore, InMemoryIdentityIndex,
    IngestConfig, IngestService, Rejection, SourceId, Submission,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lake")]
#[command(about = "HL7 v2 ingest for the data lake")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a single message
    Ingest {
        /// File holding the message
        file: PathBuf,
        /// Submitting source
        #[arg(long)]
        source: String,
        /// Character set of the message
        #[arg(long, default_value = "utf-8")]
        encoding: String,
        /// File content is already base64 encoded
        #[arg(long)]
        base64: bool,
        /// Segment terminator hint, may be repeated; without one terminators are left as sent
        #[arg(long = "seg-term")]
        seg_term: Vec<String>,
    },
    /// Ingest a batch file of concatenated messages
    Batch {
        /// Batch file
        file: PathBuf,
        /// Submitting source
        #[arg(long)]
        source: String,
    },
    /// Print the fingerprint `ingest` (or `batch`) would record for a file
    Fingerprint {
        file: PathBuf,
        /// File content is already base64 encoded
        #[arg(long)]
        base64: bool,
        /// Treat the file as a batch and print one fingerprint per message
        #[arg(long, conflicts_with = "base64")]
        batch: bool,
    },
}

type FileService = IngestService<FileIdentityIndex, FileFingerprintStore>;

/// Entry point for the `lake` command line tool.
///
/// # Environment Variables
/// - `LAKE_DATA_DIR`: root for the identity index and fingerprint store (default: "lake_data")
/// - `LAKE_SEGMENT_TERMINATORS`: JSON array of terminator hints for batches (default: `["\r\n","\n"]`)
/// - `LAKE_FINGERPRINT_LENGTH`: fingerprint length in hex characters (default: 12)
/// - `RUST_LOG`: log filter, on top of `lake=info`
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("lake=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config_from_env()?;

    match cli.command {
        Some(Commands::Ingest {
            file,
            source,
            encoding,
            base64,
            seg_term,
        }) => {
            let service = open_service(&config)?;
            let source = SourceId::new(&source)?;
            let bytes = read(&file)?;

            let submission = Submission {
                msg: encode_payload(bytes, base64)?,
                encoding,
                seg_term: (!seg_term.is_empty()).then_some(seg_term),
            };

            match service.ingest(&source, &submission) {
                Ok(staged) => println!("{}", serde_json::to_string(&staged)?),
                Err(error) => {
                    let kind = error.kind();
                    let retryable = error.is_retryable();
                    anyhow::bail!(
                        "{} rejected ({}{}): {}",
                        file.display(),
                        kind,
                        if retryable { ", retryable" } else { "" },
                        error
                    );
                }
            }
        }
        Some(Commands::Batch { file, source }) => {
            let service = open_service(&config)?;
            let source = SourceId::new(&source)?;
            let text = String::from_utf8(read(&file)?).context("batch file is not UTF-8")?;

            let mut rejected = 0;
            for result in service.ingest_batch(&source, &text, None) {
                match result {
                    Ok(staged) => println!("{}", serde_json::to_string(&staged)?),
                    Err(rejection) => {
                        rejected += 1;
                        report(&rejection);
                    }
                }
            }

            if rejected > 0 {
                anyhow::bail!("{} message(s) in {} rejected", rejected, file.display());
            }
        }
        Some(Commands::Fingerprint {
            file,
            base64,
            batch,
        }) => {
            let service = IngestService::new(
                config,
                InMemoryIdentityIndex::new(),
                InMemoryFingerprintStore::new(),
            );
            let bytes = read(&file)?;

            if batch {
                let text = String::from_utf8(bytes).context("batch file is not UTF-8")?;
                for fingerprint in service.batch_fingerprints(&text, None)? {
                    println!("{}", fingerprint);
                }
            } else {
                let submission = Submission {
                    msg: encode_payload(bytes, base64)?,
                    encoding: String::new(),
                    seg_term: None,
                };
                println!("{}", service.submission_fingerprint(&submission)?);
            }
        }
        None => {
            println!("Use 'lake --help' for commands");
        }
    }

    Ok(())
}

fn config_from_env() -> anyhow::Result<IngestConfig> {
    let config = IngestConfig::new(
        data_dir_from_env_value(std::env::var(DATA_DIR_ENV).ok()),
        segment_terminators_from_env_value(std::env::var(SEGMENT_TERMINATORS_ENV).ok())?,
        fingerprint_length_from_env_value(std::env::var(FINGERPRINT_LENGTH_ENV).ok())?,
    )?;
    Ok(config)
}

fn open_service(config: &IngestConfig) -> anyhow::Result<FileService> {
    let index = FileIdentityIndex::new(&config.identities_dir())?;
    let store = FileFingerprintStore::new(&config.fingerprints_dir())?;
    tracing::info!("Using lake data at {}", config.data_dir().display());
    Ok(IngestService::new(config.clone(), index, store))
}

/// The `msg` text of a submission built from file content.
fn encode_payload(bytes: Vec<u8>, already_encoded: bool) -> anyhow::Result<String> {
    if already_encoded {
        String::from_utf8(bytes).context("base64 payload is not text")
    } else {
        Ok(general_purpose::STANDARD.encode(&bytes))
    }
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

fn report(rejection: &Rejection) {
    let line = serde_json::json!({
        "error": rejection.kind(),
        "retryable": rejection.error.is_retryable(),
        "message": rejection.error.to_string(),
        "error_key": rejection.error_key,
        "body": rejection.body,
    });
    eprintln!("{}", line);
}
