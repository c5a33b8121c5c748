//! QoS compliance prediction CLI

use clap::{Parser, Subcommand};
use polars::prelude::*;
use qos_predict::data::{save_csv, SyntheticGenerator};
use qos_predict::prelude::*;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "qos-predict")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Predict QoS compliance of server configurations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train and evaluate a classifier
    Run {
        /// Input CSV; omitted means synthetic data
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Model type (rf, dt)
        #[arg(short, long, default_value = "rf")]
        model: String,

        /// Number of synthetic records
        #[arg(long, default_value = "1000")]
        size: usize,

        /// Random seed for generation, splitting and training
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write ROC curve points to this CSV
        #[arg(long)]
        roc_out: Option<PathBuf>,

        /// Write the metrics report to this JSON file
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },

    /// Generate a synthetic dataset and write it to CSV
    Generate {
        /// Number of records
        #[arg(short, long, default_value = "100")]
        num: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output file
        #[arg(short, long, default_value = "test_data.csv")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qos_predict=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run {
            data,
            model,
            size,
            seed,
            roc_out,
            metrics_out,
        }) => cmd_run(data, &model, size, seed, roc_out, metrics_out),
        Some(Commands::Generate { num, seed, output }) => cmd_generate(num, seed, &output),
        None => cmd_run(None, "rf", 1000, 42, None, None),
    };

    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn cmd_run(
    data: Option<PathBuf>,
    model: &str,
    size: usize,
    seed: u64,
    roc_out: Option<PathBuf>,
    metrics_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let kind: ClassifierKind = model.parse()?;
    let config = ExperimentConfig::default()
        .with_dataset_size(size)
        .with_random_seed(seed);
    let source = match data {
        Some(path) => DataSource::Csv(path),
        None => DataSource::Synthetic,
    };

    let outcome = QosExperiment::new(config).run(&source, kind)?;
    info!(
        train = outcome.n_train,
        test = outcome.n_test,
        "Run complete"
    );

    if let Some(path) = roc_out {
        match outcome.roc {
            Some(roc) => {
                write_roc_csv(&roc, &path)?;
                info!("ROC curve written to {}", path.display());
            }
            None => info!("No ROC curve available for this model, skipping export"),
        }
    }

    if let Some(path) = metrics_out {
        let json = serde_json::to_string_pretty(&outcome.metrics)?;
        std::fs::write(&path, json)?;
        info!("Metrics report written to {}", path.display());
    }

    Ok(())
}

fn cmd_generate(num: usize, seed: u64, output: &PathBuf) -> anyhow::Result<()> {
    let mut df = SyntheticGenerator::new(num, seed).generate()?;
    save_csv(&mut df, output)?;
    info!(rows = num, "Dataset written to {}", output.display());
    Ok(())
}

fn write_roc_csv(roc: &RocCurve, path: &PathBuf) -> anyhow::Result<()> {
    let mut df = df!(
        "fpr" => &roc.fpr,
        "tpr" => &roc.tpr,
        "threshold" => &roc.thresholds
    )?;
    save_csv(&mut df, path)?;
    Ok(())
}
