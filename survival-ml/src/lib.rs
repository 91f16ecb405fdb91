//! # survival-ml: Training, Evaluation & Artifact Tracking
//!
//! Fits a binary classifier on the Titanic passenger list, evaluates it with a
//! fixed battery of classification metrics, and stores every trained model under
//! a sequential identifier so performance can be compared across runs.
//!
//! ## Layout
//!
//! - [`metrics`]: metric schema, the metrics engine, history collection, reports
//! - [`model`]: the [`Classifier`] trait, logistic regression, the artifact
//!   registry, and the training / inference pipelines
//! - [`data`]: Titanic CSV loading and preprocessing
//! - [`config`]: layered configuration

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model;
pub mod persistence;

// Re-exports
pub use config::{MlConfig, TrainingConfig, TrainingOverrides, load_config};
pub use data::{Dataset, DatasetSource};
pub use error::MlError;
pub use metrics::{Metrics, PerformanceHistory, Prediction, compute_metrics};
pub use model::{ArtifactRegistry, Classifier, LogisticRegression};
