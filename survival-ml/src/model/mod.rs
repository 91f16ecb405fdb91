//! Classifiers, the artifact registry, and the training / inference pipelines.

pub mod inference;
pub mod logistic;
pub mod registry;
pub mod training;

pub use inference::predict;
pub use logistic::LogisticRegression;
pub use registry::{ArtifactFile, ArtifactMetadata, ArtifactRegistry};
pub use training::{TrainingRun, train, train_test_split};

use crate::error::MlError;

/// A binary classifier over dense numeric feature rows.
pub trait Classifier {
    /// Fit on `features` (one row per example) and 0/1 `labels`.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<(), MlError>;

    /// Probability of the positive class for each row.
    fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, MlError>;

    /// Hard 0/1 predictions; thresholds [`Classifier::predict_proba`] at 0.5 by default.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<u8>, MlError> {
        Ok(self
            .predict_proba(features)?
            .into_iter()
            .map(|p| u8::from(p >= 0.5))
            .collect())
    }
}
