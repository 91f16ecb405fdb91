//! CLI subcommand handlers.

use crate::Commands;
use survival_ml::data::load_titanic;
use survival_ml::metrics::report;
use survival_ml::model::{self, ArtifactRegistry, LogisticRegression};
use survival_ml::{DatasetSource, MlConfig, TrainingOverrides};

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, config: &MlConfig) -> anyhow::Result<()> {
    match command {
        Commands::Train {
            test_size,
            random_state,
            data,
        } => {
            let overrides = TrainingOverrides {
                test_size,
                random_state,
            };
            handle_train(config, &overrides, data.as_deref()).await
        }
        Commands::Predict {
            model_id,
            data,
            no_labels,
            json,
        } => handle_predict(config, model_id, data.as_deref(), no_labels, json).await,
        Commands::History { json } => handle_history(config, json),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(())
        }
    }
}

/// `--data` wins over the configured `data.url`.
fn resolve_source(config: &MlConfig, data: Option<&str>) -> DatasetSource {
    DatasetSource::parse(data.unwrap_or(&config.data.url))
}

async fn handle_train(
    config: &MlConfig,
    overrides: &TrainingOverrides,
    data: Option<&str>,
) -> anyhow::Result<()> {
    let dataset = load_titanic(&resolve_source(config, data)).await?;
    let registry = ArtifactRegistry::from_config(config);

    let run = model::train(
        LogisticRegression::default(),
        &dataset,
        &config.training,
        overrides,
        &registry,
    )?;

    println!(
        "Registered model {} in {}",
        run.model_id,
        registry.dir().display()
    );
    println!("\n{}", report::performance_summary(&run.metrics));
    Ok(())
}

async fn handle_predict(
    config: &MlConfig,
    model_id: u64,
    data: Option<&str>,
    no_labels: bool,
    json: bool,
) -> anyhow::Result<()> {
    let registry = ArtifactRegistry::from_config(config);
    let classifier: LogisticRegression = registry.load(model_id)?;
    if !registry.verify(model_id)? {
        tracing::warn!(model_id, "Model blob does not match its recorded digest");
    }

    let dataset = load_titanic(&resolve_source(config, data)).await?;
    let ground_truth = (!no_labels).then_some(dataset.labels.as_slice());
    let prediction = model::predict(&classifier, &dataset.features, ground_truth)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction.metrics)?);
    } else {
        println!("Model {model_id}\n");
        print!("{}", report::render_prediction(&prediction));
    }
    Ok(())
}

fn handle_history(config: &MlConfig, json: bool) -> anyhow::Result<()> {
    let history = ArtifactRegistry::from_config(config).history()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&history.records)?);
    } else {
        print!("{}", report::render_history(&history));
    }
    Ok(())
}
