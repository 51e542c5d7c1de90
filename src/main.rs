//! datapush - upload tabular data files to Cloud Firestore

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use datapush::config::{
    Config, DEFAULT_COLLECTION, DEFAULT_CREDENTIALS_FILE, DEFAULT_FACTORY_ID,
};
use datapush::firestore::{CollectionPath, FirestoreClient, ServiceAccountKey};
use datapush::parser::ParserFactory;
use datapush::report::Reporter;
use datapush::upload::{upload_table, DryRunSink, FirestoreSink};

/// Upload tabular data (CSV, Excel, Parquet, JSON) to Cloud Firestore
#[derive(Parser, Debug)]
#[command(name = "datapush")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tabular data file to upload
    input: PathBuf,

    /// Path to the service-account key file
    #[arg(short, long, default_value = DEFAULT_CREDENTIALS_FILE)]
    credentials: PathBuf,

    /// Factory document id under the top-level `factories` collection
    #[arg(short, long, default_value = DEFAULT_FACTORY_ID)]
    factory: String,

    /// Sub-collection that receives the row documents
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    collection: String,

    /// Override the project id from the key file
    #[arg(long)]
    project: Option<String>,

    /// For Excel files: which sheet to upload
    #[arg(long)]
    sheet: Option<String>,

    /// Parse and print documents without uploading
    #[arg(long)]
    dry_run: bool,

    /// Suppress the dataset summary and progress output
    #[arg(short, long)]
    quiet: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut config = Config::new(cli.input)
            .with_credentials_file(cli.credentials)
            .with_factory_id(cli.factory)
            .with_collection(cli.collection)
            .with_dry_run(cli.dry_run)
            .with_quiet(cli.quiet);
        if let Some(project) = cli.project {
            config = config.with_project_id(project);
        }
        if let Some(sheet) = cli.sheet {
            config = config.with_sheet_name(sheet);
        }
        config
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config: Config = Cli::parse().into();

    let factory = ParserFactory::new();
    let table = factory
        .parse(&config.input_file, &config)
        .with_context(|| format!("Failed to parse input file: {}", config.input_file.display()))?;

    let reporter = Reporter::new(config.quiet);
    reporter.dataset_summary(&config.input_file, &table);

    let path = CollectionPath::new(&config.factory_id, &config.collection);

    if config.dry_run {
        let mut sink = DryRunSink::new(std::io::stdout());
        let outcome = upload_table(&table, &mut sink, &reporter)?;
        reporter.dry_run_summary(outcome.documents, &path)?;
        return Ok(());
    }

    let key = ServiceAccountKey::from_file(&config.credentials_file)
        .context("Failed to load credentials")?;
    let client = FirestoreClient::new(key, config.project_id.clone())
        .context("Failed to build Firestore client")?;
    let mut sink = FirestoreSink::new(client, path.clone());

    let outcome = upload_table(&table, &mut sink, &reporter)?;
    reporter.success(outcome.documents, &path)?;
    Ok(())
}
