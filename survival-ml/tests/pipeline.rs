//! End-to-end: parse data, train several models, reload them, read the history.

use pretty_assertions::assert_eq;
use survival_ml::data::parse_titanic_csv;
use survival_ml::metrics::SkipReason;
use survival_ml::model::{ArtifactRegistry, LogisticRegression, predict, train};
use survival_ml::{Classifier, TrainingConfig, TrainingOverrides};
use tempfile::TempDir;

/// Small synthetic passenger list in the raw Titanic layout. Women and
/// first-class passengers survive.
fn passenger_csv() -> String {
    let mut csv = String::from(
        "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n",
    );
    for i in 0..60 {
        let pclass = i % 3 + 1;
        let sex = if i % 2 == 0 { "female" } else { "male" };
        let survived = u8::from(sex == "female" || pclass == 1);
        let age = if i % 17 == 5 { String::new() } else { (18 + i % 40).to_string() };
        let fare = 80.0 / pclass as f64 + (i % 7) as f64;
        csv.push_str(&format!(
            "{i},{survived},{pclass},\"Doe, Passenger {i}\",{sex},{age},0,0,T{i},{fare},,S\n"
        ));
    }
    csv
}

#[test]
fn train_reload_and_collect_history() {
    let dir = TempDir::new().unwrap();
    let registry = ArtifactRegistry::new(dir.path());
    let dataset = parse_titanic_csv(&passenger_csv()).unwrap();
    assert!(dataset.len() < 60, "rows with missing age are dropped");

    let mut runs = Vec::new();
    for seed in [1, 2, 3] {
        let run = train(
            LogisticRegression::default(),
            &dataset,
            &TrainingConfig::default(),
            &TrainingOverrides {
                test_size: None,
                random_state: Some(seed),
            },
            &registry,
        )
        .unwrap();
        runs.push(run);
    }
    let ids: Vec<u64> = runs.iter().map(|r| r.model_id).collect();
    assert_eq!(ids, vec![0, 1, 2]);

    for run in &runs {
        let loaded: LogisticRegression = registry.load(run.model_id).unwrap();
        assert_eq!(
            loaded.predict_proba(&dataset.features).unwrap(),
            run.model.predict_proba(&dataset.features).unwrap()
        );
        assert!(registry.verify(run.model_id).unwrap());
    }

    std::fs::write(registry.metadata_path(1), "{ truncated").unwrap();
    let report = registry.history().unwrap();
    let history_ids: Vec<u64> = report.records.iter().map(|r| r.index).collect();
    assert_eq!(history_ids, vec![0, 2]);
    assert!(matches!(report.warnings[0].reason, SkipReason::InvalidJson(_)));

    for record in &report.records {
        assert!((0.0..=1.0).contains(&record.roc_auc));
        assert!((0.0..=1.0).contains(&record.pr_auc));
        assert!((0.0..=1.0).contains(&record.f1));
        assert!(record.log_loss >= 0.0);
    }
}

#[test]
fn inference_on_loaded_model() {
    let dir = TempDir::new().unwrap();
    let registry = ArtifactRegistry::new(dir.path());
    let dataset = parse_titanic_csv(&passenger_csv()).unwrap();

    let run = train(
        LogisticRegression::default(),
        &dataset,
        &TrainingConfig::default(),
        &TrainingOverrides::default(),
        &registry,
    )
    .unwrap();
    let model: LogisticRegression = registry.load(run.model_id).unwrap();

    let supervised = predict(&model, &dataset.features, Some(dataset.labels.as_slice())).unwrap();
    assert_eq!(supervised.predictions.len(), dataset.len());
    assert_eq!(supervised.scores.len(), supervised.metrics.input.batch_size);
    let perf = supervised.metrics.performance.get().unwrap();
    let total: usize = perf.confusion_matrix.iter().flatten().sum();
    assert_eq!(total, dataset.len());
    assert!(perf.accuracy > 0.8);

    let unsupervised = predict(&model, &dataset.features, None).unwrap();
    assert!(unsupervised.metrics.performance.is_unsupervised());
    assert_eq!(unsupervised.predictions, supervised.predictions);
}
