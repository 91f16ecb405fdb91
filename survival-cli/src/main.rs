//! Survival CLI: train, score and track the Titanic survival classifier.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Train, evaluate and track a Titanic survival classifier
#[derive(Parser, Debug)]
#[command(name = "survival", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (holds `.survival/config.toml`)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Train a model on a seeded split and register it
    Train {
        /// Fraction of rows held out for evaluation
        #[arg(long)]
        test_size: Option<f64>,
        /// Seed for the split shuffle
        #[arg(long)]
        random_state: Option<u64>,
        /// Dataset path or URL (defaults to `data.url`)
        #[arg(long)]
        data: Option<String>,
    },
    /// Score a dataset with a registered model
    Predict {
        /// Identifier of the registered model
        #[arg(long)]
        model_id: u64,
        /// Dataset path or URL (defaults to `data.url`)
        #[arg(long)]
        data: Option<String>,
        /// Ignore the `Survived` column and skip supervised metrics
        #[arg(long)]
        no_labels: bool,
        /// Print the metrics as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Show supervised metrics of every registered model
    History {
        /// Print the records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "survival", "survival")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "survival.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let config = survival_ml::load_config(Some(&workspace), cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    commands::handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_overrides() {
        let cli = Cli::try_parse_from([
            "survival",
            "-vv",
            "train",
            "--test-size",
            "0.3",
            "--random-state",
            "7",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Train {
                test_size,
                random_state,
                data,
            } => {
                assert_eq!(test_size, Some(0.3));
                assert_eq!(random_state, Some(7));
                assert!(data.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_predict() {
        let cli = Cli::try_parse_from([
            "survival",
            "--config",
            "custom.toml",
            "predict",
            "--model-id",
            "3",
            "--data",
            "test.csv",
            "--no-labels",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(
            cli.command,
            Commands::Predict {
                model_id: 3,
                no_labels: true,
                json: false,
                ..
            }
        ));
    }

    #[test]
    fn test_predict_requires_model_id() {
        assert!(Cli::try_parse_from(["survival", "predict"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["survival", "-q"]).is_err());
    }
}
