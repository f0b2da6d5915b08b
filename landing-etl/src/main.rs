//! landing-etl - SpaceX launch history cleaning tool
//!
//! Fetches launch records from the SpaceX v4 API, cleans them into a flat
//! twelve-column table with a binary landing `class`, and derives scaled
//! train/test feature matrices from the cleaned table.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use landing_common::config::{self, LoggingConfig, TomlConfig};
use landing_etl::export::{self, ExportFormat};
use landing_etl::features::{split_and_scale, FeatureMatrix};
use landing_etl::metrics::{
    overall_success_rate, success_rate_by, Category, ClassificationMetrics,
};
use landing_etl::models::parse_launch_batch;
use landing_etl::services::SpaceXClient;
use landing_etl::{clean_api_data, CleanedBatch, ImputationPolicy, RawFlightRecord};

/// Command-line arguments for landing-etl
#[derive(Parser, Debug)]
#[command(name = "landing-etl")]
#[command(about = "Clean SpaceX launch history into a landing-outcome table")]
#[command(version)]
struct Args {
    /// Config file (overrides LANDING_CONFIG and the platform config file)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Launch history endpoint
    #[arg(long, global = true, env = "LANDING_LAUNCHES_URL")]
    launches_url: Option<String>,

    /// Payload catalogue endpoint
    #[arg(long, global = true, env = "LANDING_PAYLOADS_URL")]
    payloads_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the raw launch history as JSON
    Fetch {
        /// Output file (default: <raw_dir>/spacex_api_data.json)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Clean a saved launch batch, or the live launch history
    Clean {
        /// Saved raw launches JSON; fetched live when omitted
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,

        /// Output file (default: <interim_dir>/launches_clean.<format>)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },

    /// Print landing success rates grouped by a column
    Summary {
        /// Saved raw launches JSON; fetched live when omitted
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,

        #[arg(long, value_enum)]
        by: Category,
    },

    /// Write scaled train/test feature matrices
    Features {
        /// Saved raw launches JSON; fetched live when omitted
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,

        /// Output directory (default: <processed_dir>)
        #[arg(long, value_name = "PATH")]
        out_dir: Option<PathBuf>,

        /// Fraction of rows held out for testing (default from config)
        #[arg(long)]
        test_size: Option<f64>,

        /// Shuffle seed (default from config)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write a config file holding the defaults
    InitConfig {
        /// Destination (default: the platform config file)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

/// Install the fmt subscriber. RUST_LOG wins over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    match &logging.file {
        Some(path) => {
            export::ensure_parent_dir(path).with_context(|| {
                format!("Failed to create log directory for {}", path.display())
            })?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is needed to set up logging, so the load outcome is reported after init
    let source = config::resolve_config_source(args.config.as_deref());
    let (mut cfg, outcome) =
        config::load_from_source(&source).context("Failed to load configuration")?;
    init_tracing(&cfg.logging)?;
    outcome.log();

    if let Some(url) = args.launches_url {
        cfg.api.launches_url = url;
    }
    if let Some(url) = args.payloads_url {
        cfg.api.payloads_url = url;
    }
    cfg.validate().context("Invalid configuration")?;

    match args.command {
        Command::Fetch { out } => {
            let out = out.unwrap_or_else(|| cfg.paths.raw_dir.join("spacex_api_data.json"));
            let client = build_client(&cfg)?;
            let launches = client
                .fetch_launches()
                .await
                .context("Failed to fetch launch history")?;
            export::write_raw_launches(&out, &launches)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Saved {} launches to {}", launches.len(), out.display());
        }

        Command::Clean { input, out, format } => {
            let out = out.unwrap_or_else(|| {
                cfg.paths
                    .interim_dir
                    .join(format!("launches_clean.{}", format.ext()))
            });
            let batch = load_and_clean(&cfg, input.as_deref()).await?;
            export::write_cleaned(&out, &batch.records, format)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote {} cleaned launches to {}", batch.records.len(), out.display());
        }

        Command::Summary { input, by } => {
            let batch = load_and_clean(&cfg, input.as_deref()).await?;
            print_summary(&batch, by);
        }

        Command::Features {
            input,
            out_dir,
            test_size,
            seed,
        } => {
            let out_dir = out_dir.unwrap_or_else(|| cfg.paths.processed_dir.clone());
            let test_size = test_size.unwrap_or(cfg.features.test_size);
            let seed = seed.unwrap_or(cfg.features.random_state);

            let batch = load_and_clean(&cfg, input.as_deref()).await?;
            write_features(&batch, &out_dir, test_size, seed)?;
        }

        Command::InitConfig { out } => {
            let out = match out {
                Some(path) => path,
                None => config::default_config_path()
                    .context("No platform config directory; pass --out")?,
            };
            if out.exists() {
                warn!(path = %out.display(), "Overwriting existing config file");
            }
            config::write_toml_config(&TomlConfig::default(), &out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote default configuration to {}", out.display());
        }
    }

    Ok(())
}

fn build_client(cfg: &TomlConfig) -> Result<SpaceXClient> {
    SpaceXClient::new(&cfg.api).context("Failed to build HTTP client")
}

/// Read a saved batch or fetch the live one, then run the cleaning pipeline
async fn load_and_clean(cfg: &TomlConfig, input: Option<&Path>) -> Result<CleanedBatch> {
    let client = build_client(cfg)?;

    let records: Vec<RawFlightRecord> = match input {
        Some(path) => export::read_launch_file(path)
            .with_context(|| format!("Failed to read launches from {}", path.display()))?,
        None => {
            let launches = client
                .fetch_launches()
                .await
                .context("Failed to fetch launch history")?;
            parse_launch_batch(serde_json::Value::Array(launches))
                .context("Launch history has an unexpected shape")?
        }
    };

    let policy = ImputationPolicy::from(&cfg.cleaning);
    Ok(clean_api_data(&client, &records, &policy).await)
}

fn print_summary(batch: &CleanedBatch, by: Category) {
    println!(
        "{} launches, overall landing success rate {:.3}",
        batch.records.len(),
        overall_success_rate(&batch.records)
    );
    println!();
    println!("{:<24} {:>8} {:>8} {:>8}", by.column(), "launches", "landed", "rate");
    for group in success_rate_by(&batch.records, by) {
        println!(
            "{:<24} {:>8} {:>8} {:>8.3}",
            group.key, group.launches, group.landings, group.rate
        );
    }
}

fn write_features(batch: &CleanedBatch, out_dir: &Path, test_size: f64, seed: u64) -> Result<()> {
    let matrix = FeatureMatrix::from_records(&batch.records);
    let (split, _scaler) = split_and_scale(&matrix, test_size, seed)
        .context("Failed to split feature matrix")?;

    for (name, part) in [("train.csv", &split.train), ("test.csv", &split.test)] {
        let path = out_dir.join(name);
        let (header, rows) = part.to_table();
        export::write_table(&path, &header, &rows)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    // Majority-class baseline on the held-out rows
    let positives = split.train.targets.iter().filter(|&&t| t == 1).count();
    let majority = u8::from(positives * 2 >= split.train.len());
    let predicted = vec![majority; split.test.len()];
    let baseline = ClassificationMetrics::from_labels(&split.test.targets, &predicted)?;

    info!(
        features = matrix.width(),
        train_rows = split.train.len(),
        test_rows = split.test.len(),
        baseline_accuracy = baseline.accuracy,
        "Wrote feature matrices"
    );
    println!(
        "Wrote {} train / {} test rows ({} features) to {}",
        split.train.len(),
        split.test.len(),
        matrix.width(),
        out_dir.display()
    );
    println!(
        "Majority-class baseline (predict {}): accuracy {:.3}, f1 {:.3}",
        majority, baseline.accuracy, baseline.f1
    );
    Ok(())
}
