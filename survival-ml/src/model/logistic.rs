//! Logistic regression trained by batch gradient descent.

use crate::error::MlError;
use crate::model::Classifier;
use serde::{Deserialize, Serialize};

/// Binary logistic regression on standardized features with an L2 penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Fitted {
    weights: Vec<f64>,
    bias: f64,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.1, 1000, 1e-4)
    }
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, epochs: usize, l2: f64) -> Self {
        Self {
            learning_rate,
            epochs,
            l2,
            fitted: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Learned weights in standardized feature space, if fitted.
    pub fn weights(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.weights.as_slice())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn check_rows(features: &[Vec<f64>], width: usize) -> Result<(), MlError> {
    for (i, row) in features.iter().enumerate() {
        if row.len() != width {
            return Err(MlError::shape_mismatch(format!(
                "row {i} has {} features, expected {width}",
                row.len()
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(MlError::invalid_input(format!("row {i} has a non-finite feature")));
        }
    }
    Ok(())
}

impl Fitted {
    fn standardize(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }

    fn logit(&self, z: &[f64]) -> f64 {
        self.bias + z.iter().zip(&self.weights).map(|(x, w)| x * w).sum::<f64>()
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<(), MlError> {
        if features.len() != labels.len() {
            return Err(MlError::shape_mismatch(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        let Some(first) = features.first() else {
            return Err(MlError::EmptyBatch);
        };
        let width = first.len();
        check_rows(features, width)?;
        if let Some(&value) = labels.iter().find(|&&l| l > 1) {
            return Err(MlError::InvalidLabel {
                field: "labels",
                value,
            });
        }

        let n = features.len() as f64;
        let means: Vec<f64> = (0..width)
            .map(|j| features.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect();
        let stds: Vec<f64> = (0..width)
            .map(|j| {
                let var = features.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n;
                if var > 0.0 { var.sqrt() } else { 1.0 }
            })
            .collect();

        let mut state = Fitted {
            weights: vec![0.0; width],
            bias: 0.0,
            means,
            stds,
        };
        let rows: Vec<Vec<f64>> = features.iter().map(|r| state.standardize(r)).collect();

        for _ in 0..self.epochs {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;
            for (z, &y) in rows.iter().zip(labels) {
                let err = sigmoid(state.logit(z)) - f64::from(y);
                for (g, x) in grad_w.iter_mut().zip(z) {
                    *g += err * x;
                }
                grad_b += err;
            }
            for (w, g) in state.weights.iter_mut().zip(&grad_w) {
                *w -= self.learning_rate * (g / n + self.l2 * *w);
            }
            state.bias -= self.learning_rate * grad_b / n;
        }

        tracing::debug!(rows = rows.len(), features = width, epochs = self.epochs, "Fitted logistic regression");
        self.fitted = Some(state);
        Ok(())
    }

    fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, MlError> {
        let state = self
            .fitted
            .as_ref()
            .ok_or_else(|| MlError::model("logistic regression is not fitted"))?;
        check_rows(features, state.weights.len())?;
        Ok(features
            .iter()
            .map(|row| sigmoid(state.logit(&state.standardize(row))))
            .collect())
    }
}
