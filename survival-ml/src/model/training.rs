//! Training pipeline: split, fit, evaluate on the held-out rows, register.

use crate::config::{TrainingConfig, TrainingOverrides};
use crate::data::Dataset;
use crate::error::MlError;
use crate::metrics::evaluation::compute_metrics;
use crate::metrics::schema::Metrics;
use crate::model::Classifier;
use crate::model::registry::ArtifactRegistry;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

/// Result of one training run.
#[derive(Debug, Clone)]
pub struct TrainingRun<M> {
    pub model: M,
    /// Metrics on the held-out partition.
    pub metrics: Metrics,
    /// Identifier the artifact was saved under.
    pub model_id: u64,
}

/// Shuffle `0..n` with `seed` and cut it into `(train, test)` index sets.
///
/// The test partition takes `ceil(n * test_size)` rows. Equal `n`, `test_size`
/// and `seed` always give the same partitions.
pub fn train_test_split(
    n: usize,
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), MlError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(MlError::Config(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(MlError::invalid_input(format!(
            "cannot split {n} rows with test_size {test_size}: both partitions need rows"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Fit `model` on a seeded split of `dataset`, evaluate it on the held-out rows
/// and save it through `registry`.
///
/// `overrides` are merged onto `defaults` field by field. Metric and registry
/// errors are returned as-is.
pub fn train<M>(
    mut model: M,
    dataset: &Dataset,
    defaults: &TrainingConfig,
    overrides: &TrainingOverrides,
    registry: &ArtifactRegistry,
) -> Result<TrainingRun<M>, MlError>
where
    M: Classifier + Serialize,
{
    let config = defaults.merge(overrides);
    config.validate()?;

    let (train_idx, test_idx) =
        train_test_split(dataset.len(), config.test_size, config.random_state)?;
    let train_set = dataset.select(&train_idx);
    let test_set = dataset.select(&test_idx);
    tracing::info!(
        train_rows = train_set.len(),
        test_rows = test_set.len(),
        test_size = config.test_size,
        random_state = config.random_state,
        "Starting training run"
    );

    model.fit(&train_set.features, &train_set.labels)?;

    let metrics = compute_metrics(
        &model.predict(&test_set.features)?,
        &model.predict_proba(&test_set.features)?,
        Some(test_set.labels.as_slice()),
    )?;

    let model_id = registry.save(&model, &metrics)?;
    if let Some(perf) = metrics.performance.get() {
        tracing::info!(model_id, roc_auc = perf.roc_auc, f1 = perf.f1, "Training run complete");
    }

    Ok(TrainingRun {
        model,
        metrics,
        model_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogisticRegression;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn dataset(n: usize) -> Dataset {
        let features = (0..n).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let labels = (0..n).map(|i| u8::from(i >= n / 2)).collect();
        Dataset::new(vec!["x".into(), "y".into()], features, labels).unwrap()
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = train_test_split(50, 0.2, 7).unwrap();
        let b = train_test_split(50, 0.2, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 40);
        assert_eq!(a.1.len(), 10);

        let c = train_test_split(50, 0.2, 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_partitions_every_row_once() {
        let (train, test) = train_test_split(23, 0.3, 1).unwrap();
        assert_eq!(test.len(), 7);
        let mut all: Vec<usize> = train.into_iter().chain(test).collect();
        all.sort_unstable();
        assert_eq!(all, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_rejects_degenerate_sizes() {
        assert!(train_test_split(1, 0.5, 0).is_err());
        assert!(train_test_split(0, 0.5, 0).is_err());
        assert!(train_test_split(10, 0.0, 0).is_err());
        assert!(train_test_split(10, 1.0, 0).is_err());
    }

    #[test]
    fn test_train_saves_artifact_with_held_out_metrics() {
        let dir = TempDir::new().unwrap();
        let registry = ArtifactRegistry::new(dir.path());
        let data = dataset(40);

        let run = train(
            LogisticRegression::default(),
            &data,
            &TrainingConfig::default(),
            &TrainingOverrides {
                test_size: Some(0.25),
                random_state: None,
            },
            &registry,
        )
        .unwrap();

        assert_eq!(run.model_id, 0);
        assert_eq!(run.metrics.input.batch_size, 10);
        assert!(run.metrics.performance.get().is_some());
        assert!(run.model.is_fitted());

        let stored = registry.metadata(0).unwrap();
        assert_eq!(stored.metrics, run.metrics);
        let loaded: LogisticRegression = registry.load(0).unwrap();
        assert_eq!(loaded, run.model);
    }

    #[test]
    fn test_same_seed_same_metrics() {
        let dir = TempDir::new().unwrap();
        let registry = ArtifactRegistry::new(dir.path());
        let data = dataset(30);
        let config = TrainingConfig::default();

        let first = train(
            LogisticRegression::default(),
            &data,
            &config,
            &TrainingOverrides::default(),
            &registry,
        )
        .unwrap();
        let second = train(
            LogisticRegression::default(),
            &data,
            &config,
            &TrainingOverrides::default(),
            &registry,
        )
        .unwrap();

        assert_eq!(first.model_id, 0);
        assert_eq!(second.model_id, 1);
        assert_eq!(first.metrics, second.metrics);
    }

    #[test]
    fn test_invalid_override_fails_before_saving() {
        let dir = TempDir::new().unwrap();
        let registry = ArtifactRegistry::new(dir.path());
        let err = train(
            LogisticRegression::default(),
            &dataset(10),
            &TrainingConfig::default(),
            &TrainingOverrides {
                test_size: Some(1.5),
                random_state: None,
            },
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, MlError::Config(_)));
        assert!(registry.list().unwrap().is_empty());
    }
}
