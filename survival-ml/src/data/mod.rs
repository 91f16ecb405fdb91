//! Dataset loading: the Titanic passenger list as a numeric feature matrix.

pub mod source;
pub mod titanic;

pub use source::{DatasetSource, load_titanic};
pub use titanic::parse_titanic_csv;

use crate::error::MlError;
use serde::{Deserialize, Serialize};

/// Public copy of the Titanic training set.
pub const TITANIC_URL: &str =
    "https://raw.githubusercontent.com/datasciencedojo/datasets/master/titanic.csv";

/// Row-aligned features and 0/1 labels without missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<u8>,
    ) -> Result<Self, MlError> {
        if features.len() != labels.len() {
            return Err(MlError::shape_mismatch(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some(i) = features.iter().position(|r| r.len() != feature_names.len()) {
            return Err(MlError::shape_mismatch(format!(
                "row {i} has {} features, expected {}",
                features[i].len(),
                feature_names.len()
            )));
        }
        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}
